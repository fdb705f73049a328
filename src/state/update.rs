//! # State transition record.
//!
//! A [`RecoverableUpdate`] describes one observed transition of a recoverable:
//! who, to which state, and when (unix seconds). Updates are built fresh for
//! each observation and never mutated; the monitoring loop attaches them to
//! [`EventKind::StateChanged`](crate::EventKind::StateChanged) events.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::HealthState;

/// One observed state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableUpdate {
    id: Arc<str>,
    to_state: HealthState,
    updated: i64,
}

impl RecoverableUpdate {
    /// Records a transition of `id` to `to_state`, stamped with the current time.
    pub fn new(id: impl Into<Arc<str>>, to_state: HealthState) -> Self {
        Self::at(id, to_state, Utc::now().timestamp())
    }

    /// Records a transition with an explicit timestamp (seconds since epoch).
    pub fn at(id: impl Into<Arc<str>>, to_state: HealthState, updated: i64) -> Self {
        Self {
            id: id.into(),
            to_state,
            updated,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn to_state(&self) -> HealthState {
        self.to_state
    }

    /// Creation time in seconds since the unix epoch.
    pub fn updated(&self) -> i64 {
        self.updated
    }
}

impl fmt::Display for RecoverableUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.updated, 0) {
            Some(at) => write!(
                f,
                "Updated recoverable:[{}] to State:[{}] at [{}]",
                self.id,
                self.to_state,
                at.to_rfc3339()
            ),
            None => write!(
                f,
                "Updated recoverable:[{}] to State:[{}] at [{}s]",
                self.id, self.to_state, self.updated
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_transition() {
        let update = RecoverableUpdate::at("db", HealthState::Recovering, 0);
        assert_eq!(
            update.to_string(),
            "Updated recoverable:[db] to State:[RECOVERING] at [1970-01-01T00:00:00+00:00]"
        );
    }

    #[test]
    fn new_is_stamped_now() {
        let before = Utc::now().timestamp();
        let update = RecoverableUpdate::new("db", HealthState::Failed);
        assert!(update.updated() >= before);
        assert_eq!(update.id(), "db");
        assert_eq!(update.to_state(), HealthState::Failed);
    }
}
