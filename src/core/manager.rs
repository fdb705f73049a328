//! # RecoverableManager: registry facade and watch lifecycle.
//!
//! The [`RecoverableManager`] owns the registry, the event bus, the
//! subscriber fan-out and the handle of the running monitoring loop.
//!
//! ## Key responsibilities
//! - register / deregister / look up recoverables by id
//! - start and stop the [`HealthChecker`] loop (both idempotent)
//! - turn every absorbed error into an [`Event`] for the subscribers
//!
//! ## High-level architecture
//! ```text
//! register(r) ──► Registry.insert ─┬─ Ok  ─► RecoverableRegistered
//!                                  └─ Err ─► DuplicateRegistration (debug), no-op
//!
//! start_watching()
//!   ├─ registry empty   ─► StartRefused (error), not running
//!   ├─ already running  ─► AlreadyWatching (debug), no-op
//!   └─ spawn HealthChecker::run(child token) ─► WatchStarted
//!
//! stop_watching()
//!   └─ cancel token ─► await loop exit ─► WatchStopped
//!
//! Bus ──► subscriber_listener ──► SubscriberSet ──► LogWriter / custom subscribers
//!
//! shutdown()
//!   └─ stop_watching ─► cancel runtime token ─► listener drains the bus
//!                                            ─► SubscriberSet::shutdown (queues flushed)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use recoverable::{Config, HealthState, Recoverable, RecoverableManager};
//!
//! struct Worker;
//!
//! #[async_trait]
//! impl Recoverable for Worker {
//!     fn id(&self) -> &str { "worker" }
//!     async fn status(&self) -> HealthState { HealthState::Healthy }
//!     async fn recover(&self) -> bool { true }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = Config::default();
//!     cfg.poll_interval = Duration::from_millis(100);
//!
//!     let manager = RecoverableManager::builder(cfg).build();
//!     manager.register(Arc::new(Worker)).await;
//!
//!     assert!(manager.start_watching().await);
//!     tokio::time::sleep(Duration::from_millis(250)).await;
//!     manager.stop_watching().await;
//! }
//! ```

use std::sync::Arc;

use tokio::{
    sync::{
        Mutex,
        broadcast::{
            self,
            error::{RecvError, TryRecvError},
        },
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        builder::ManagerBuilder,
        checker::{HealthChecker, TickReport},
        config::Config,
        registry::Registry,
    },
    error::ManagerError,
    events::{Bus, Event, EventKind},
    recoverables::RecoverableRef,
    state::HealthState,
    subscribers::SubscriberSet,
};

/// Handle to a running watch session.
struct WatchHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// Supervises registered recoverables and drives their recovery.
pub struct RecoverableManager {
    cfg: Config,
    bus: Bus,
    subscribers: usize,
    registry: Arc<Registry>,
    checker: HealthChecker,
    watch: Mutex<Option<WatchHandle>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    runtime_token: CancellationToken,
}

impl RecoverableManager {
    /// Returns a builder; see [`ManagerBuilder`].
    pub fn builder(cfg: Config) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: SubscriberSet,
        registry: Arc<Registry>,
        runtime_token: CancellationToken,
    ) -> Self {
        let checker = HealthChecker::new(Arc::clone(&registry), cfg.clone(), bus.clone());
        let subscribers = subs.len();
        let listener = spawn_subscriber_listener(&bus, subs, runtime_token.clone());
        Self {
            cfg,
            bus,
            subscribers,
            registry,
            checker,
            watch: Mutex::new(None),
            listener: Mutex::new(Some(listener)),
            runtime_token,
        }
    }

    /// Configuration this manager was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Registers `recoverable` under its id.
    ///
    /// Returns `false` (and reports `DuplicateRegistration` at debug level) if
    /// the id is already registered; the existing entry is kept.
    pub async fn register(&self, recoverable: RecoverableRef) -> bool {
        let id = recoverable.id().to_string();
        match self.registry.insert(recoverable).await {
            Ok(()) => {
                self.bus
                    .publish(Event::new(EventKind::RecoverableRegistered).with_recoverable(id));
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Deregisters the entry registered under `recoverable`'s id.
    ///
    /// Returns the removed handle, or `None` (reporting `UnknownIdentifier`)
    /// if nothing is registered under that id.
    pub async fn deregister(&self, recoverable: &RecoverableRef) -> Option<RecoverableRef> {
        self.deregister_id(recoverable.id()).await
    }

    /// Deregisters by id; see [`deregister`](Self::deregister).
    pub async fn deregister_id(&self, id: &str) -> Option<RecoverableRef> {
        match self.registry.remove(id).await {
            Ok(removed) => {
                self.bus
                    .publish(Event::new(EventKind::RecoverableDeregistered).with_recoverable(id));
                Some(removed)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Snapshot of all registered recoverables, in unspecified order.
    pub async fn recoverables(&self) -> Vec<RecoverableRef> {
        self.registry.list().await
    }

    /// The exact handle registered under `id`, or `None` (reporting
    /// `UnknownIdentifier`).
    pub async fn get(&self, id: &str) -> Option<RecoverableRef> {
        self.registry
            .get(id)
            .await
            .map_err(|err| self.report(&err))
            .ok()
    }

    /// Last state the loop observed for `id`.
    ///
    /// `Some(Recovering)` while a recovery attempt is in flight, `None` if the
    /// id is unknown (reported) or has not been probed yet.
    pub async fn state_of(&self, id: &str) -> Option<HealthState> {
        self.registry
            .state_of(id)
            .await
            .map_err(|err| self.report(&err))
            .ok()
            .flatten()
    }

    /// Number of registered recoverables.
    pub async fn len(&self) -> usize {
        self.registry.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.is_empty().await
    }

    /// Starts the monitoring loop.
    ///
    /// Returns `true` if a new loop was started. Refused (reported at error
    /// level) when nothing is registered; a no-op (reported at debug level)
    /// when the loop is already running. A stopped manager can be started again.
    pub async fn start_watching(&self) -> bool {
        let mut watch = self.watch.lock().await;

        if watch.as_ref().is_some_and(|w| !w.join.is_finished()) {
            self.report(&ManagerError::AlreadyWatching);
            return false;
        }

        let count = self.registry.len().await;
        if count == 0 {
            self.report(&ManagerError::EmptyRegistryOnStart);
            return false;
        }

        let token = self.runtime_token.child_token();
        let join = tokio::spawn(self.checker.clone().run(token.clone()));
        *watch = Some(WatchHandle { token, join });

        self.bus
            .publish(Event::new(EventKind::WatchStarted).with_count(count));
        true
    }

    /// Stops the monitoring loop and waits for it to exit.
    ///
    /// A tick in progress finishes first; no tick runs after this returns.
    /// Does nothing if the loop is not running.
    pub async fn stop_watching(&self) {
        let Some(handle) = self.watch.lock().await.take() else {
            return;
        };

        handle.token.cancel();
        let _ = handle.join.await;
        self.bus.publish(Event::new(EventKind::WatchStopped));
    }

    /// True while a monitoring loop is running.
    pub async fn is_watching(&self) -> bool {
        self.watch
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| !w.join.is_finished())
    }

    /// Runs one scan right now, independent of the timer.
    ///
    /// Same semantics as a tick; a recoverable already being recovered by the
    /// loop is skipped rather than recovered twice.
    pub async fn check_now(&self) -> TickReport {
        self.checker.scan().await
    }

    /// Receiver for all events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Short informational summary; the format is not stable.
    pub async fn status(&self) -> String {
        format!(
            "watching={} recoverables={} subscribers={}",
            self.is_watching().await,
            self.len().await,
            self.subscribers
        )
    }

    /// Stops watching and flushes the subscribers.
    ///
    /// Every event published before this call is delivered to the configured
    /// subscribers, and their workers are awaited. Afterwards events reach
    /// [`subscribe`](Self::subscribe) receivers only, and the manager can no
    /// longer watch. Calling it again does nothing.
    pub async fn shutdown(&self) {
        self.stop_watching().await;
        self.runtime_token.cancel();

        let listener = self.listener.lock().await.take();
        if let Some(join) = listener {
            let _ = join.await;
        }
    }

    fn report(&self, err: &ManagerError) {
        self.bus.publish(Event::from_error(err));
    }
}

/// Forwards bus events to the subscriber set until `rt` is cancelled, then
/// delivers what is still buffered and shuts the set down.
fn spawn_subscriber_listener(
    bus: &Bus,
    set: SubscriberSet,
    rt: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = rt.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(ev),
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(_)) => {
                        set.emit(Event::subscriber_overflow("subscriber_listener", "lagged"));
                    }
                }
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(ev),
                Err(TryRecvError::Lagged(_)) => {
                    set.emit(Event::subscriber_overflow("subscriber_listener", "lagged"));
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    })
}

impl Drop for RecoverableManager {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}
