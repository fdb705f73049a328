//! # LogWriter: leveled event reporter over `tracing`
//!
//! Renders every [`Event`] as one line and emits it at the level given by
//! [`Event::severity`], with the recoverable id, state and error label as
//! structured fields. Install any `tracing` subscriber to see the output.
//!
//! ## Example output
//! ```text
//! DEBUG recoverable: [duplicate] recoverable [db] is already being watched recoverable="db" label="duplicate_registration"
//! INFO  recoverable: [state] Updated recoverable:[db] to State:[RECOVERING] at [..] recoverable="db" state="RECOVERING"
//! ERROR recoverable: [recovery-failed] could not recover [db] recoverable="db" label="recovery_failure"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind, Severity};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// One-line rendering of an event.
fn render(e: &Event) -> String {
    let id = e.recoverable.as_deref().unwrap_or("-");
    let reason = e.reason.as_deref().unwrap_or("");
    match e.kind {
        EventKind::RecoverableRegistered => format!("[registered] recoverable={id}"),
        EventKind::DuplicateRegistration => format!("[duplicate] {reason}"),
        EventKind::RecoverableDeregistered => format!("[deregistered] recoverable={id}"),
        EventKind::UnknownIdentifier => format!("[unknown-id] {reason}"),
        EventKind::WatchStarted => {
            format!("[watch-started] recoverables={}", e.count.unwrap_or(0))
        }
        EventKind::StartRefused => format!("[start-refused] {reason}"),
        EventKind::AlreadyWatching => format!("[already-watching] {reason}"),
        EventKind::WatchStopped => "[watch-stopped]".to_string(),
        EventKind::TickCompleted => {
            format!("[tick] scanned={} {reason}", e.count.unwrap_or(0))
        }
        EventKind::StateChanged => match &e.update {
            Some(update) => format!("[state] {update}"),
            None => format!("[state] recoverable={id} state={:?}", e.state),
        },
        EventKind::StatusTimeout => format!("[status-timeout] {reason}"),
        EventKind::RecoveryStarted => format!("[recovering] recoverable={id}"),
        EventKind::RecoverySucceeded => format!("[recovered] recoverable={id}"),
        EventKind::RecoveryFailed => format!("[recovery-failed] {reason}"),
        EventKind::RecoveryTimedOut => format!("[recovery-timeout] {reason}"),
        EventKind::RecoverySkipped => format!("[recovery-skipped] recoverable={id} in flight"),
        EventKind::RecoverablePanicked => format!("[panicked] {reason}"),
        EventKind::SubscriberOverflow => format!("[subscriber-overflow] {reason}"),
        EventKind::SubscriberPanicked => format!(
            "[subscriber-panicked] subscriber={} info={reason}",
            e.subscriber.unwrap_or("-")
        ),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let msg = render(e);
        let recoverable = e.recoverable.as_deref();
        let state = e.state.map(|s| s.as_str());
        let label = e.label;
        let subscriber = e.subscriber;

        match e.severity() {
            Severity::Debug => debug!(target: "recoverable", seq = e.seq, recoverable, subscriber, state, label, "{msg}"),
            Severity::Info => info!(target: "recoverable", seq = e.seq, recoverable, subscriber, state, label, "{msg}"),
            Severity::Warn => warn!(target: "recoverable", seq = e.seq, recoverable, subscriber, state, label, "{msg}"),
            Severity::Error => error!(target: "recoverable", seq = e.seq, recoverable, subscriber, state, label, "{msg}"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManagerError;
    use crate::state::{HealthState, RecoverableUpdate};

    #[test]
    fn renders_errors_with_their_message() {
        let ev = Event::from_error(&ManagerError::UnknownIdentifier { id: "db".into() });
        assert_eq!(render(&ev), "[unknown-id] recoverable [db] could not be found");
    }

    #[test]
    fn renders_state_changes_through_the_update() {
        let ev = Event::state_changed(RecoverableUpdate::at("db", HealthState::Healthy, 0));
        assert_eq!(
            render(&ev),
            "[state] Updated recoverable:[db] to State:[HEALTHY] at [1970-01-01T00:00:00+00:00]"
        );
    }

    #[test]
    fn renders_tick_summary() {
        let ev = Event::new(EventKind::TickCompleted)
            .with_count(3)
            .with_reason("recovered=1 failed=0 skipped=0 unresponsive=0");
        assert_eq!(
            render(&ev),
            "[tick] scanned=3 recovered=1 failed=0 skipped=0 unresponsive=0"
        );
    }

    #[test]
    fn renders_subscriber_panics_with_the_subscriber_name() {
        let ev = Event::subscriber_panicked("audit", "boom".into());
        assert_eq!(render(&ev), "[subscriber-panicked] subscriber=audit info=boom");
    }
}
