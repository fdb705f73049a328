//! # Health states.
//!
//! [`HealthState`] is reported by [`Recoverable::status`](crate::Recoverable::status)
//! and polled by the monitoring loop once per tick.
//!
//! ```text
//! HEALTHY ──(status says FAILED)──► FAILED ──(recover() in flight)──► RECOVERING
//!    ▲                                                                    │
//!    └────────────────────(next poll says HEALTHY)────────────────────────┘
//! ```
//!
//! States carry no ordering beyond identity. Numeric codes (`1..=3`) exist for
//! compact storage; any other code renders as `UNKNOWN`.

use std::fmt;

/// Health of a supervised component at one observation instant.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthState {
    /// Operating normally.
    Healthy = 1,
    /// A recovery attempt is in progress.
    Recovering = 2,
    /// Unhealthy; eligible for a recovery attempt.
    Failed = 3,
}

impl HealthState {
    /// Numeric code of the state.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parses a numeric code, `None` when out of range.
    ///
    /// # Example
    /// ```
    /// use recoverable::HealthState;
    ///
    /// assert_eq!(HealthState::from_code(3), Some(HealthState::Failed));
    /// assert_eq!(HealthState::from_code(0), None);
    /// ```
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(HealthState::Healthy),
            2 => Some(HealthState::Recovering),
            3 => Some(HealthState::Failed),
            _ => None,
        }
    }

    /// Diagnostic label.
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Healthy => "HEALTHY",
            HealthState::Recovering => "RECOVERING",
            HealthState::Failed => "FAILED",
        }
    }

    #[inline]
    pub fn is_failed(self) -> bool {
        matches!(self, HealthState::Failed)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label for a raw state code, `UNKNOWN` for anything out of range.
pub fn state_label(code: u8) -> &'static str {
    HealthState::from_code(code).map_or("UNKNOWN", HealthState::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_labels() {
        for state in [
            HealthState::Healthy,
            HealthState::Recovering,
            HealthState::Failed,
        ] {
            assert_eq!(HealthState::from_code(state.code()), Some(state));
            assert_eq!(state_label(state.code()), state.to_string());
        }
    }

    #[test]
    fn out_of_range_code_is_unknown() {
        assert_eq!(state_label(0), "UNKNOWN");
        assert_eq!(state_label(42), "UNKNOWN");
    }

    #[test]
    fn only_failed_is_failed() {
        assert!(HealthState::Failed.is_failed());
        assert!(!HealthState::Recovering.is_failed());
        assert!(!HealthState::Healthy.is_failed());
    }
}
