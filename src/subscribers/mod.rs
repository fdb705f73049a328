//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait (the injected reporting
//! capability) and the machinery that feeds it.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Manager / HealthChecker ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                              │
//!                                                              ▼
//!                                                        SubscriberSet::emit
//!                                                    ┌─────────┼─────────┐
//!                                                    ▼         ▼         ▼
//!                                                LogWriter   Metrics   Custom
//! ```
//!
//! ## Contents
//! - [`Subscribe`] extension point for custom reporters
//! - [`SubscriberSet`] per-subscriber queues and workers
//! - `LogWriter` leveled reporter over `tracing` (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::SubscriberSet;
pub use subscribe::Subscribe;
