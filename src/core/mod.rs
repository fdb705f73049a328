//! Runtime core: registry, monitoring loop and manager.
//!
//! The public API from this module is [`RecoverableManager`] (built via
//! [`ManagerBuilder`]), its [`Config`] and the per-scan [`TickReport`].
//!
//! Internal modules:
//! - [`probe`]: checks one recoverable once (status, then recovery if failed);
//! - [`checker`]: the periodic loop scanning the registry;
//! - [`registry`]: lock-guarded id → recoverable store;
//! - [`manager`]: public facade, watch lifecycle and error reporting;
//! - [`builder`]: wiring of bus, subscribers and registry.

mod builder;
mod checker;
mod config;
mod manager;
mod probe;
mod registry;

pub use builder::ManagerBuilder;
pub use checker::TickReport;
pub use config::Config;
pub use manager::RecoverableManager;
