//! # HealthChecker: the monitoring loop.
//!
//! Periodically scans the [`Registry`] and checks every recoverable via
//! [`check_once`]. One `HealthChecker::run` future is one watch session.
//!
//! ## Architecture
//! ```text
//! RecoverableManager::start_watching() ──► spawn HealthChecker::run(token)
//!
//! loop {
//!   select! {
//!     token.cancelled()  → exit
//!     interval.tick()    → scan():
//!        ├─► registry.snapshot()            (under the lock, fixed for the tick)
//!        ├─► check_once(entry) for each     (concurrently, joined before the tick ends)
//!        └─► publish TickCompleted{ scanned, outcome summary }
//!   }
//! }
//! ```
//!
//! ## Rules
//! - First tick fires one full period after start (no immediate scan)
//! - A tick in progress runs to completion; cancellation is observed between ticks
//! - Ticks missed while a slow scan runs are delayed, not bursted
//! - Registry changes between ticks take effect on the next snapshot

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::Config,
        probe::{Outcome, check_once},
        registry::Registry,
    },
    events::{Bus, Event, EventKind},
};

/// Summary of one scan over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Recoverables checked.
    pub scanned: usize,
    /// Failed recoverables whose `recover()` succeeded.
    pub recovered: usize,
    /// Failed recoverables whose `recover()` returned `false`, timed out or panicked.
    pub failed: usize,
    /// Failed recoverables skipped because a recovery was already in flight.
    pub skipped: usize,
    /// Recoverables whose `status()` timed out or panicked.
    pub unresponsive: usize,
}

impl TickReport {
    fn record(&mut self, outcome: Outcome) {
        self.scanned += 1;
        match outcome {
            Outcome::Idle => {}
            Outcome::Recovered => self.recovered += 1,
            Outcome::RecoveryFailed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Unresponsive => self.unresponsive += 1,
        }
    }

    fn summary(&self) -> String {
        format!(
            "recovered={} failed={} skipped={} unresponsive={}",
            self.recovered, self.failed, self.skipped, self.unresponsive
        )
    }
}

/// Drives periodic scans of the registry.
#[derive(Clone)]
pub(crate) struct HealthChecker {
    registry: Arc<Registry>,
    cfg: Config,
    bus: Bus,
}

impl HealthChecker {
    pub(crate) fn new(registry: Arc<Registry>, cfg: Config, bus: Bus) -> Self {
        Self { registry, cfg, bus }
    }

    /// Runs scans every `poll_period` until `token` is cancelled.
    pub(crate) async fn run(self, token: CancellationToken) {
        let period = self.cfg.poll_period();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    self.scan().await;
                }
            }
        }
    }

    /// Checks every registered recoverable once.
    pub(crate) async fn scan(&self) -> TickReport {
        let entries = self.registry.snapshot().await;

        let outcomes = join_all(
            entries
                .iter()
                .map(|entry| check_once(entry, &self.cfg, &self.bus)),
        )
        .await;

        let mut report = TickReport::default();
        for outcome in outcomes {
            report.record(outcome);
        }

        self.bus.publish(
            Event::new(EventKind::TickCompleted)
                .with_count(report.scanned)
                .with_reason(report.summary()),
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recoverables::Recoverable;
    use crate::state::HealthState;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct Counted {
        id: &'static str,
        state: HealthState,
        status_calls: AtomicU32,
    }

    #[async_trait]
    impl Recoverable for Counted {
        fn id(&self) -> &str {
            self.id
        }
        async fn status(&self) -> HealthState {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.state
        }
        async fn recover(&self) -> bool {
            false
        }
    }

    fn counted(id: &'static str, state: HealthState) -> Arc<Counted> {
        Arc::new(Counted {
            id,
            state,
            status_calls: AtomicU32::new(0),
        })
    }

    fn checker(period: Duration) -> (HealthChecker, Arc<Registry>) {
        let registry = Registry::new();
        let cfg = Config {
            poll_interval: period,
            ..Config::default()
        };
        (
            HealthChecker::new(registry.clone(), cfg, Bus::new(64)),
            registry,
        )
    }

    #[tokio::test]
    async fn scan_summarises_outcomes() {
        let (checker, registry) = checker(Duration::from_secs(5));
        registry
            .insert(counted("ok", HealthState::Healthy))
            .await
            .unwrap();
        registry
            .insert(counted("bad", HealthState::Failed))
            .await
            .unwrap();
        registry
            .insert(counted("busy", HealthState::Recovering))
            .await
            .unwrap();

        let report = checker.scan().await;

        assert_eq!(
            report,
            TickReport {
                scanned: 3,
                failed: 1,
                ..TickReport::default()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period_and_cancel_stops_ticks() {
        let (checker, registry) = checker(Duration::from_millis(100));
        let probe = counted("a", HealthState::Healthy);
        registry.insert(probe.clone()).await.unwrap();

        let token = CancellationToken::new();
        let join = tokio::spawn(checker.run(token.clone()));

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(probe.status_calls.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(probe.status_calls.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(probe.status_calls.load(Ordering::SeqCst), 2);

        token.cancel();
        join.await.unwrap();
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(probe.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn registry_changes_apply_on_next_tick() {
        let (checker, registry) = checker(Duration::from_millis(100));
        let a = counted("a", HealthState::Healthy);
        let b = counted("b", HealthState::Healthy);
        registry.insert(a.clone()).await.unwrap();

        let token = CancellationToken::new();
        let join = tokio::spawn(checker.run(token.clone()));

        time::sleep(Duration::from_millis(150)).await;
        registry.insert(b.clone()).await.unwrap();
        registry.remove("a").await.unwrap();
        time::sleep(Duration::from_millis(100)).await;

        assert_eq!(a.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.status_calls.load(Ordering::SeqCst), 1);

        token.cancel();
        join.await.unwrap();
    }
}
