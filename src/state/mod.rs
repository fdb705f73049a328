//! Health state model.
//!
//! - [`HealthState`] the three-valued health of a recoverable
//! - [`RecoverableUpdate`] one observed state transition

mod health;
mod update;

pub use health::{HealthState, state_label};
pub use update::RecoverableUpdate;
