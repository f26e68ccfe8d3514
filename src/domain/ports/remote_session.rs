//! Remote session port
//!
//! Everything the pipeline needs from a remote host: run one command to
//! completion, copy one file, hang up. Stage logic only ever talks to this
//! trait, so a different transport (or several sessions in parallel) can be
//! plugged in without touching it.

use std::path::Path;

use crate::config::DeploymentTarget;
use crate::error::HoistResult;

/// Captured result of one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status; `-1` when the remote side reported none (e.g. killed by a signal)
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// One authenticated connection to one host.
///
/// Implementations must make [`close`](RemoteSession::close) idempotent.
pub trait RemoteSession {
    /// Run a shell command line and block until it exits. No timeout is
    /// applied; a hung command hangs the caller.
    ///
    /// `Err` means the channel itself failed, not that the command did.
    fn run(&mut self, command: &str) -> HoistResult<CommandOutput>;

    /// Copy a local file to `remote_path`, replacing whatever is there.
    fn upload(&mut self, local_path: &Path, remote_path: &str) -> HoistResult<()>;

    /// Release the connection. Safe to call more than once.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Opens sessions to a [`DeploymentTarget`].
pub trait Connector {
    type Session: RemoteSession;

    /// Authenticate and return a ready session.
    ///
    /// Fails with `HoistError::Authentication` when credentials are rejected
    /// and `HoistError::Connection` for anything else.
    fn connect(&self, target: &DeploymentTarget) -> HoistResult<Self::Session>;
}
