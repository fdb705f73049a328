//! # Manager configuration.
//!
//! Provides [`Config`] centralized settings for the manager and its
//! monitoring loop.
//!
//! ## Sentinel values
//! - `status_timeout = 0s` → `status()` calls are not bounded
//! - `recover_timeout = 0s` → `recover()` calls are not bounded
//! - `poll_interval` below 1ms is raised to 1ms (a zero period is not a timer)

use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a [`RecoverableManager`](crate::RecoverableManager).
///
/// ## Field semantics
/// - `poll_interval`: time between health scans
/// - `status_timeout`: bound on one `status()` call (`0s` = unbounded)
/// - `recover_timeout`: bound on one `recover()` call (`0s` = unbounded)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Time between two scans of the registry.
    ///
    /// Failure detection latency is bounded by this period plus scan time.
    pub poll_interval: Duration,

    /// Maximum time one `status()` call may take before the probe is
    /// abandoned for this tick and reported as `StatusTimeout`.
    pub status_timeout: Duration,

    /// Maximum time one `recover()` call may take before it is abandoned and
    /// reported as `RecoveryTimedOut`. The next tick will try again.
    pub recover_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the scan period, never shorter than 1ms.
    #[inline]
    pub fn poll_period(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    /// Returns the `status()` bound as an `Option` (`None` → unbounded).
    #[inline]
    pub fn status_limit(&self) -> Option<Duration> {
        non_zero(self.status_timeout)
    }

    /// Returns the `recover()` bound as an `Option` (`None` → unbounded).
    #[inline]
    pub fn recover_limit(&self) -> Option<Duration> {
        non_zero(self.recover_timeout)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

fn non_zero(d: Duration) -> Option<Duration> {
    if d == Duration::ZERO { None } else { Some(d) }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `poll_interval = 5s`
    /// - `status_timeout = 1s`
    /// - `recover_timeout = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            status_timeout: Duration::from_secs(1),
            recover_timeout: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_every_five_seconds() {
        let cfg = Config::default();
        assert_eq!(cfg.poll_period(), Duration::from_secs(5));
        assert_eq!(cfg.status_limit(), Some(Duration::from_secs(1)));
        assert_eq!(cfg.recover_limit(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_values_are_sentinels() {
        let cfg = Config {
            poll_interval: Duration::ZERO,
            status_timeout: Duration::ZERO,
            recover_timeout: Duration::ZERO,
            bus_capacity: 0,
        };
        assert_eq!(cfg.poll_period(), MIN_POLL_INTERVAL);
        assert_eq!(cfg.status_limit(), None);
        assert_eq!(cfg.recover_limit(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
