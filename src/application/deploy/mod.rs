//! Deploy Module
//!
//! Orchestrates a deployment to one target.
//!
//! ## Structure
//!
//! - `cancel` - Interruption flag shared with the signal handler (`CancelFlag`)
//! - `result` - Result types (`DeployReport`, `DeployOutcome`)
//! - `pipeline` - The stage sequence (`DeployPipeline`)
//!
//! ## Usage
//!
//! ```ignore
//! use hoist::application::deploy::{CancelFlag, DeployPipeline};
//!
//! let pipeline = DeployPipeline::new(&target, &sink, CancelFlag::new());
//! let report = pipeline.execute(&OpenSshConnector::new());
//! std::process::exit(report.exit_code());
//! ```

mod cancel;
mod pipeline;
mod result;

pub use cancel::CancelFlag;
pub use pipeline::DeployPipeline;
pub use result::{DeployOutcome, DeployReport, EXIT_CANCELLED, EXIT_FAILURE, EXIT_SUCCESS};
