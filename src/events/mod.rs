//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the manager, the monitoring loop
//! and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Severity`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `RecoverableManager` (registry/watch events), `HealthChecker`
//!   (tick summaries), `probe::check_once` (health events), `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: the manager's subscriber listener (fans out to
//!   `SubscriberSet`) and receivers from `RecoverableManager::subscribe()`.

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind, Severity};
