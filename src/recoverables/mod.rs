//! # Recoverable capability.
//!
//! - [`Recoverable`] trait for components that report health and can self-recover
//! - [`RecoverableRef`] shared handle (`Arc<dyn Recoverable>`) held by the registry

mod recoverable;

pub use recoverable::{Recoverable, RecoverableRef};
