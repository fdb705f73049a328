//! # Recoverable abstraction.
//!
//! A [`Recoverable`] is any component that can answer "how are you?" and can
//! try to fix itself. The manager never owns it: the registry keeps a
//! [`RecoverableRef`] clone only while it is registered.

use std::sync::Arc;

use async_trait::async_trait;

use crate::state::HealthState;

/// Shared handle to a recoverable.
pub type RecoverableRef = Arc<dyn Recoverable>;

/// # Pollable, self-recovering component.
///
/// Contract:
/// - [`id`](Recoverable::id) is stable for the whole registration and unique
///   within one manager.
/// - [`status`](Recoverable::status) is called every tick; it must be cheap
///   and free of side effects. Slow answers are cut off by
///   [`Config::status_timeout`](crate::Config::status_timeout).
/// - [`recover`](Recoverable::recover) is called only after `status` returned
///   [`HealthState::Failed`], never twice concurrently for the same
///   registration. It may be slow; it is bounded by
///   [`Config::recover_timeout`](crate::Config::recover_timeout).
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use async_trait::async_trait;
/// use recoverable::{HealthState, Recoverable};
///
/// struct Connection {
///     up: AtomicBool,
/// }
///
/// #[async_trait]
/// impl Recoverable for Connection {
///     fn id(&self) -> &str { "primary-db" }
///
///     async fn status(&self) -> HealthState {
///         if self.up.load(Ordering::Relaxed) { HealthState::Healthy } else { HealthState::Failed }
///     }
///
///     async fn recover(&self) -> bool {
///         // reconnect...
///         self.up.store(true, Ordering::Relaxed);
///         true
///     }
/// }
/// ```
#[async_trait]
pub trait Recoverable: Send + Sync + 'static {
    /// Stable identifier, used as the registry key.
    fn id(&self) -> &str;

    /// Current health.
    async fn status(&self) -> HealthState;

    /// Attempts to bring the component back to healthy; `true` on success.
    async fn recover(&self) -> bool;
}
