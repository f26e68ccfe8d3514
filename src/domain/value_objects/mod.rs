//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod probe;
mod stage;
mod summary;

pub use probe::{PortStatus, ServiceState};
pub use stage::{StageId, StagePolicy, StageStatus};
pub use summary::DeploySummary;
