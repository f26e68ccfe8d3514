//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `archive` - Zip packaging of the local source tree
//! - `ssh/` - OpenSSH-backed [`RemoteSession`](crate::domain::ports::RemoteSession)

pub mod archive;
pub mod ssh;

// Re-export for convenience
pub use archive::{ArchiveBuilder, ArchiveStats};
pub use ssh::{OpenSshConnector, OpenSshSession};
