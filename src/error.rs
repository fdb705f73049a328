//! Error taxonomy of the recoverable manager.
//!
//! None of these errors is ever returned to a caller as `Err`: the manager
//! absorbs them, answers with `bool`/`Option`, and attaches the error to the
//! [`Event`](crate::Event) it publishes. [`ManagerError::as_label`] and
//! [`ManagerError::as_message`] are what ends up in the event stream.

use std::any::Any;
use std::time::Duration;
use thiserror::Error;

/// # Conditions reported by the manager and the monitoring loop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// A recoverable with this id is already registered; the first one is kept.
    #[error("recoverable [{id}] is already being watched")]
    DuplicateRegistration {
        /// Conflicting identifier.
        id: String,
    },

    /// Lookup or deregistration of an id that is not registered.
    #[error("recoverable [{id}] could not be found")]
    UnknownIdentifier {
        /// Missing identifier.
        id: String,
    },

    /// `start_watching` was called with nothing registered.
    #[error("no recoverables to watch")]
    EmptyRegistryOnStart,

    /// `start_watching` was called while the loop is already running.
    #[error("monitoring loop is already running")]
    AlreadyWatching,

    /// `recover()` returned `false`.
    #[error("could not recover [{id}]")]
    RecoveryFailure {
        /// Recoverable that failed to recover.
        id: String,
    },

    /// `recover()` did not finish within the configured bound.
    #[error("recovery of [{id}] timed out after {timeout:?}")]
    RecoveryTimeout {
        /// Recoverable whose recovery was abandoned.
        id: String,
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// `status()` did not answer within the configured bound.
    #[error("status of [{id}] timed out after {timeout:?}")]
    StatusTimeout {
        /// Recoverable whose probe was abandoned.
        id: String,
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// `status()` or `recover()` panicked; the loop keeps running.
    #[error("recoverable [{id}] panicked in {call}(): {info}")]
    RecoverablePanicked {
        /// Recoverable that panicked.
        id: String,
        /// Which call panicked (`status` or `recover`).
        call: &'static str,
        /// Panic payload, when it was a string.
        info: String,
    },
}

impl ManagerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use recoverable::ManagerError;
    ///
    /// let err = ManagerError::UnknownIdentifier { id: "db".into() };
    /// assert_eq!(err.as_label(), "unknown_identifier");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::DuplicateRegistration { .. } => "duplicate_registration",
            ManagerError::UnknownIdentifier { .. } => "unknown_identifier",
            ManagerError::EmptyRegistryOnStart => "empty_registry_on_start",
            ManagerError::AlreadyWatching => "already_watching",
            ManagerError::RecoveryFailure { .. } => "recovery_failure",
            ManagerError::RecoveryTimeout { .. } => "recovery_timeout",
            ManagerError::StatusTimeout { .. } => "status_timeout",
            ManagerError::RecoverablePanicked { .. } => "recoverable_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }

    /// Identifier of the recoverable the error is about, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            ManagerError::DuplicateRegistration { id }
            | ManagerError::UnknownIdentifier { id }
            | ManagerError::RecoveryFailure { id }
            | ManagerError::RecoveryTimeout { id, .. }
            | ManagerError::StatusTimeout { id, .. }
            | ManagerError::RecoverablePanicked { id, .. } => Some(id),
            ManagerError::EmptyRegistryOnStart | ManagerError::AlreadyWatching => None,
        }
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let cases = [
            (
                ManagerError::DuplicateRegistration { id: "a".into() },
                "duplicate_registration",
            ),
            (ManagerError::EmptyRegistryOnStart, "empty_registry_on_start"),
            (ManagerError::AlreadyWatching, "already_watching"),
            (
                ManagerError::RecoveryTimeout {
                    id: "a".into(),
                    timeout: Duration::from_secs(1),
                },
                "recovery_timeout",
            ),
        ];
        for (err, label) in cases {
            assert_eq!(err.as_label(), label);
        }
    }

    #[test]
    fn id_is_exposed_for_recoverable_errors() {
        let err = ManagerError::RecoveryFailure { id: "cache".into() };
        assert_eq!(err.id(), Some("cache"));
        assert_eq!(err.as_message(), "could not recover [cache]");
        assert_eq!(ManagerError::EmptyRegistryOnStart.id(), None);
    }

    #[test]
    fn panic_reports_the_call_and_payload() {
        let err = ManagerError::RecoverablePanicked {
            id: "db".into(),
            call: "recover",
            info: panic_message(&"boom"),
        };
        assert_eq!(err.as_label(), "recoverable_panicked");
        assert_eq!(err.as_message(), "recoverable [db] panicked in recover(): boom");
        assert_eq!(err.id(), Some("db"));
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
