use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{manager::RecoverableManager, registry::Registry};
use crate::{
    core::Config,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`RecoverableManager`].
pub struct ManagerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers (the manager's reporting sinks).
    ///
    /// Subscribers receive every registry, watch and health event through
    /// dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Adds the built-in [`LogWriter`](crate::LogWriter).
    #[cfg(feature = "logging")]
    pub fn with_logging(self) -> Self {
        self.with_subscriber(Arc::new(crate::LogWriter::new()))
    }

    /// Builds and returns the manager.
    ///
    /// Initializes the event bus, the registry, subscriber workers and the
    /// subscriber listener. Must be called from within a tokio runtime.
    /// Call [`RecoverableManager::shutdown`] to flush the subscribers.
    pub fn build(self) -> Arc<RecoverableManager> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());

        Arc::new(RecoverableManager::new_internal(
            self.cfg,
            bus,
            subs,
            Registry::new(),
            CancellationToken::new(),
        ))
    }
}
