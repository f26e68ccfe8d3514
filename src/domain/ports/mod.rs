//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod remote_session;

pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink, NoticeLevel};
pub use remote_session::{CommandOutput, Connector, RemoteSession};

#[cfg(test)]
pub(crate) use deploy_events::recording;
