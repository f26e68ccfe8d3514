//! Hoist - single-target deployment orchestrator
//!
//! Hoist packages a web application's source tree, ships it to one host over
//! SSH and drives that host through a fixed sequence of provisioning stages:
//! directory setup, upload, unpack, dependency install, build, systemd
//! registration, nginx configuration, certificate issuance and verification.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    fetch_logs, run_step, CancelFlag, DeployOutcome, DeployPipeline, DeployReport, LogFetch, Step,
    StepResult,
};
pub use config::{load_target, ConfigWarning, Credential, DeploymentTarget, Secret};
pub use domain::ports::{
    CommandOutput, Connector, DeployEvent, DeployEventSink, NoopEventSink, NoticeLevel,
    RemoteSession,
};
pub use domain::value_objects::{DeploySummary, PortStatus, ServiceState, StageId, StageStatus};
pub use error::{HoistError, HoistResult};
pub use infrastructure::{ArchiveBuilder, ArchiveStats, OpenSshConnector};
