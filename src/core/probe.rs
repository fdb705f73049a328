//! # Check a single recoverable once.
//!
//! Reads one recoverable's status and, if it is `FAILED`, runs one recovery
//! attempt. Publishes every observation and outcome to the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! status() ─┬─ timeout ──► StatusTimeout                       → Unresponsive
//!            └─ panic   ──► RecoverablePanicked                 → Unresponsive
//!    │
//!    ├─ state differs from last observation ──► StateChanged
//!    │
//!    ├─ HEALTHY / RECOVERING                                    → Idle
//!    │
//!    └─ FAILED
//!         ├─ recovery already in flight ──► RecoverySkipped      → Skipped
//!         └─ RecoveryStarted
//!              recover()
//!                ├─ true    ──► RecoverySucceeded                → Recovered
//!                ├─ false   ──► RecoveryFailed                   → RecoveryFailed
//!                ├─ timeout ──► RecoveryTimedOut                 → RecoveryFailed
//!                └─ panic   ──► RecoverablePanicked              → RecoveryFailed
//! ```
//!
//! ## Rules
//! - At most **one** `recover()` call per check, and never while another is in flight
//! - A failed or timed-out recovery is not retried here; the next tick tries again
//! - A timed-out or panicking probe takes no action (the component is neither healthy nor known-failed)
//! - Panics inside a recoverable are caught here; they never reach the monitoring loop

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::{
    core::{config::Config, registry::Entry},
    error::{ManagerError, panic_message},
    events::{Bus, Event, EventKind},
    state::{HealthState, RecoverableUpdate},
};

/// Result of checking one recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Healthy or recovering on its own; nothing to do.
    Idle,
    /// `status()` did not answer in time or panicked.
    Unresponsive,
    /// Failed, and a recovery was already in flight.
    Skipped,
    /// Failed, and `recover()` succeeded.
    Recovered,
    /// Failed, and `recover()` returned `false`, timed out or panicked.
    RecoveryFailed,
}

/// How a bounded call into a recoverable ended.
enum Call<T> {
    Done(T),
    TimedOut,
    Panicked(String),
}

/// Checks `entry` once: probe, then recover if failed.
pub(crate) async fn check_once(entry: &Entry, cfg: &Config, bus: &Bus) -> Outcome {
    let id = entry.recoverable.id();

    let limit = cfg.status_limit();
    let state = match bounded(limit, entry.recoverable.status()).await {
        Call::Done(state) => state,
        Call::TimedOut => {
            bus.publish(Event::from_error(&ManagerError::StatusTimeout {
                id: id.to_string(),
                timeout: limit.unwrap_or_default(),
            }));
            return Outcome::Unresponsive;
        }
        Call::Panicked(info) => {
            bus.publish(Event::from_error(&ManagerError::RecoverablePanicked {
                id: id.to_string(),
                call: "status",
                info,
            }));
            return Outcome::Unresponsive;
        }
    };

    if entry.tracker.observe(state) {
        bus.publish(Event::state_changed(RecoverableUpdate::new(id, state)));
    }

    match state {
        HealthState::Healthy | HealthState::Recovering => Outcome::Idle,
        HealthState::Failed => recover(entry, cfg, bus).await,
    }
}

/// Runs one recovery attempt unless another one is in flight.
async fn recover(entry: &Entry, cfg: &Config, bus: &Bus) -> Outcome {
    let id = entry.recoverable.id();

    let Some(_guard) = entry.tracker.begin_recovery() else {
        bus.publish(
            Event::new(EventKind::RecoverySkipped)
                .with_recoverable(id)
                .with_state(HealthState::Failed),
        );
        return Outcome::Skipped;
    };

    bus.publish(
        Event::new(EventKind::RecoveryStarted)
            .with_recoverable(id)
            .with_state(HealthState::Failed),
    );

    let limit = cfg.recover_limit();
    match bounded(limit, entry.recoverable.recover()).await {
        Call::Done(true) => {
            bus.publish(Event::new(EventKind::RecoverySucceeded).with_recoverable(id));
            Outcome::Recovered
        }
        Call::Done(false) => {
            bus.publish(Event::from_error(&ManagerError::RecoveryFailure {
                id: id.to_string(),
            }));
            Outcome::RecoveryFailed
        }
        Call::TimedOut => {
            bus.publish(Event::from_error(&ManagerError::RecoveryTimeout {
                id: id.to_string(),
                timeout: limit.unwrap_or_default(),
            }));
            Outcome::RecoveryFailed
        }
        Call::Panicked(info) => {
            bus.publish(Event::from_error(&ManagerError::RecoverablePanicked {
                id: id.to_string(),
                call: "recover",
                info,
            }));
            Outcome::RecoveryFailed
        }
    }
}

/// Awaits `fut`, giving up after `limit` if one is set and catching panics.
async fn bounded<F: Future>(limit: Option<Duration>, fut: F) -> Call<F::Output> {
    let guarded = AssertUnwindSafe(fut).catch_unwind();
    let result = match limit {
        Some(dur) => match time::timeout(dur, guarded).await {
            Ok(result) => result,
            Err(_) => return Call::TimedOut,
        },
        None => guarded.await,
    };
    match result {
        Ok(value) => Call::Done(value),
        Err(payload) => Call::Panicked(panic_message(&*payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::Tracker;
    use crate::recoverables::Recoverable;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Stuck {
        recover_calls: AtomicU32,
        recover_result: bool,
        hang_status: bool,
        hang_recover: bool,
        panic_status: bool,
        panic_recover: bool,
    }

    impl Stuck {
        fn failed(recover_result: bool) -> Self {
            Self {
                recover_calls: AtomicU32::new(0),
                recover_result,
                hang_status: false,
                hang_recover: false,
                panic_status: false,
                panic_recover: false,
            }
        }
    }

    #[async_trait]
    impl Recoverable for Stuck {
        fn id(&self) -> &str {
            "stuck"
        }
        async fn status(&self) -> HealthState {
            if self.hang_status {
                time::sleep(Duration::from_secs(3600)).await;
            }
            if self.panic_status {
                panic!("status exploded");
            }
            HealthState::Failed
        }
        async fn recover(&self) -> bool {
            self.recover_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_recover {
                time::sleep(Duration::from_secs(3600)).await;
            }
            if self.panic_recover {
                panic!("recover exploded");
            }
            self.recover_result
        }
    }

    fn entry(r: Stuck) -> (Entry, Arc<Stuck>) {
        let r = Arc::new(r);
        let entry = Entry {
            recoverable: r.clone(),
            tracker: Arc::new(Tracker::default()),
        };
        (entry, r)
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test]
    async fn failed_then_recovered() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let (entry, r) = entry(Stuck::failed(true));

        let outcome = check_once(&entry, &Config::default(), &bus).await;

        assert_eq!(outcome, Outcome::Recovered);
        assert_eq!(r.recover_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            drain(&mut rx),
            vec![
                EventKind::StateChanged,
                EventKind::RecoveryStarted,
                EventKind::RecoverySucceeded,
            ]
        );
    }

    #[tokio::test]
    async fn failed_recovery_is_reported() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let (entry, _r) = entry(Stuck::failed(false));

        let outcome = check_once(&entry, &Config::default(), &bus).await;

        assert_eq!(outcome, Outcome::RecoveryFailed);
        assert_eq!(drain(&mut rx).last(), Some(&EventKind::RecoveryFailed));
    }

    #[tokio::test]
    async fn in_flight_recovery_is_not_duplicated() {
        let bus = Bus::new(64);
        let (entry, r) = entry(Stuck::failed(true));
        let _held = entry.tracker.begin_recovery().unwrap();

        let outcome = check_once(&entry, &Config::default(), &bus).await;

        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(r.recover_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_status_is_cut_off() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut stuck = Stuck::failed(true);
        stuck.hang_status = true;
        let (entry, r) = entry(stuck);

        let outcome = check_once(&entry, &Config::default(), &bus).await;

        assert_eq!(outcome, Outcome::Unresponsive);
        assert_eq!(r.recover_calls.load(Ordering::SeqCst), 0);
        assert_eq!(drain(&mut rx), vec![EventKind::StatusTimeout]);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_recovery_times_out_and_releases_the_slot() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut stuck = Stuck::failed(true);
        stuck.hang_recover = true;
        let (entry, _r) = entry(stuck);
        let cfg = Config {
            recover_timeout: Duration::from_secs(2),
            ..Config::default()
        };

        let outcome = check_once(&entry, &cfg, &bus).await;

        assert_eq!(outcome, Outcome::RecoveryFailed);
        assert_eq!(drain(&mut rx).last(), Some(&EventKind::RecoveryTimedOut));
        assert!(entry.tracker.begin_recovery().is_some());
    }

    #[tokio::test]
    async fn panicking_status_takes_no_action() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut stuck = Stuck::failed(true);
        stuck.panic_status = true;
        let (entry, r) = entry(stuck);

        let outcome = check_once(&entry, &Config::default(), &bus).await;

        assert_eq!(outcome, Outcome::Unresponsive);
        assert_eq!(r.recover_calls.load(Ordering::SeqCst), 0);
        let ev = rx.try_recv().expect("panic reported");
        assert_eq!(ev.kind, EventKind::RecoverablePanicked);
        assert_eq!(
            ev.reason.as_deref(),
            Some("recoverable [stuck] panicked in status(): status exploded")
        );
    }

    #[tokio::test]
    async fn panicking_recovery_counts_as_failed_and_frees_the_slot() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut stuck = Stuck::failed(true);
        stuck.panic_recover = true;
        let (entry, _r) = entry(stuck);

        let outcome = check_once(&entry, &Config::default(), &bus).await;

        assert_eq!(outcome, Outcome::RecoveryFailed);
        assert_eq!(drain(&mut rx).last(), Some(&EventKind::RecoverablePanicked));
        assert!(entry.tracker.begin_recovery().is_some());
    }

    #[tokio::test]
    async fn persistent_failure_reports_one_state_change() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let (entry, r) = entry(Stuck::failed(false));

        for _ in 0..3 {
            check_once(&entry, &Config::default(), &bus).await;
        }

        let kinds = drain(&mut rx);
        let changes = kinds
            .iter()
            .filter(|k| **k == EventKind::StateChanged)
            .count();
        assert_eq!(changes, 1);
        assert_eq!(r.recover_calls.load(Ordering::SeqCst), 3);
    }
}
