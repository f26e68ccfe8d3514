//! Application Layer
//!
//! Use cases that orchestrate the deployment flow.
//! This layer:
//! - Depends on Domain layer (ports, value objects)
//! - Talks to remote hosts only through `RemoteSession`
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployPipeline` - The twelve-stage deployment
//! - `fetch_logs` - Tail of the service journal
//!
//! ## Services
//!
//! - `run_step` - One described remote command with uniform reporting
//! - `probe` - Classification of port and service probes
//! - `templates` - systemd unit, nginx site and certbot command text

pub mod artifact;
pub mod deploy;
pub mod logs;
pub mod probe;
pub mod step;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact::ArchiveArtifact;
pub use deploy::{CancelFlag, DeployOutcome, DeployPipeline, DeployReport};
pub use logs::{fetch_logs, LogFetch};
pub use step::{run_step, Step, StepResult};
