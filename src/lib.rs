//! # recoverable
//!
//! **recoverable** is a lightweight, in-process health supervisor for tokio
//! applications.
//!
//! Components that can report their own health implement [`Recoverable`] and
//! register with a [`RecoverableManager`]. Once watching, the manager polls
//! every registered component on a fixed period and, when one reports
//! [`HealthState::Failed`], invokes its self-recovery routine.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Recoverable  │   │ Recoverable  │   │ Recoverable  │
//!     │ (db conn)    │   │ (worker)     │   │ (cache)      │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ register         ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  RecoverableManager                                               │
//! │  - Registry (id → recoverable, RwLock-guarded)                    │
//! │  - HealthChecker (periodic scan, spawned by start_watching)       │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to injected subscribers)               │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ every poll_interval                              │
//!        ▼                                                  │ publishes
//!   for each entry (concurrently):                          │ Events
//!     status() ──► FAILED? ──► recover() ──► ok / failed    │
//!        │                                                  ▼
//!        └──────────────────────────────► Bus ──► LogWriter / custom Subscribe
//! ```
//!
//! ### Tick
//! ```text
//! snapshot registry (under lock)
//!   ├─► status()  (bounded by status_timeout, panics caught)
//!   │     ├─ changed since last poll ─► StateChanged{ RecoverableUpdate }
//!   │     ├─ HEALTHY / RECOVERING     ─► nothing
//!   │     └─ FAILED
//!   │           ├─ recovery in flight ─► RecoverySkipped
//!   │           └─ recover()  (bounded by recover_timeout, panics caught)
//!   │                 ├─ true  ─► RecoverySucceeded
//!   │                 └─ false ─► RecoveryFailed (retried next tick)
//!   └─► TickCompleted{ scanned, summary }
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                       |
//! |-------------------|----------------------------------------------------------|------------------------------------------|
//! | **Capability**    | Components that report health and recover themselves.    | [`Recoverable`], [`RecoverableRef`]      |
//! | **Supervision**   | Registry plus periodic monitoring loop.                  | [`RecoverableManager`], [`TickReport`]   |
//! | **State model**   | Health states and transition records.                    | [`HealthState`], [`RecoverableUpdate`]   |
//! | **Reporting**     | Leveled events delivered to injected subscribers.        | [`Event`], [`Severity`], [`Subscribe`]   |
//! | **Errors**        | Typed taxonomy of absorbed, non-fatal conditions.        | [`ManagerError`]                         |
//! | **Configuration** | Poll period, call bounds, bus capacity.                  | [`Config`]                               |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber that reports
//!   events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use recoverable::{Config, HealthState, Recoverable, RecoverableManager};
//!
//! struct Connection {
//!     up: AtomicBool,
//! }
//!
//! #[async_trait]
//! impl Recoverable for Connection {
//!     fn id(&self) -> &str { "primary-db" }
//!
//!     async fn status(&self) -> HealthState {
//!         if self.up.load(Ordering::Relaxed) { HealthState::Healthy } else { HealthState::Failed }
//!     }
//!
//!     async fn recover(&self) -> bool {
//!         self.up.store(true, Ordering::Relaxed);
//!         true
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = Config::default();
//!     cfg.poll_interval = Duration::from_millis(50);
//!
//!     let manager = RecoverableManager::builder(cfg).build();
//!     let conn = Arc::new(Connection { up: AtomicBool::new(false) });
//!     manager.register(conn.clone()).await;
//!
//!     manager.start_watching().await;
//!     tokio::time::sleep(Duration::from_millis(120)).await;
//!     manager.shutdown().await;
//!
//!     assert!(conn.up.load(Ordering::Relaxed));
//! }
//! ```
mod core;
mod error;
mod events;
mod recoverables;
mod state;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Config, ManagerBuilder, RecoverableManager, TickReport};
pub use error::ManagerError;
pub use events::{Event, EventKind, Severity};
pub use recoverables::{Recoverable, RecoverableRef};
pub use state::{HealthState, RecoverableUpdate, state_label};
pub use subscribers::Subscribe;

// Optional: leveled reporter over `tracing`.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
