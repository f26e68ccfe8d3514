//! Log Fetcher
//!
//! Opens its own session, reads the tail of the service's journal and hangs up.

use crate::config::DeploymentTarget;
use crate::domain::ports::{Connector, RemoteSession};
use crate::error::HoistResult;

/// Captured journal tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFetch {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

pub fn journal_command(service_name: &str, lines: usize) -> String {
    format!("journalctl -u {} -n {} --no-pager", service_name, lines)
}

/// Fetch the last `lines` journal entries of the target's service.
///
/// A non-zero `journalctl` exit is returned, not raised; only connection and
/// channel problems are errors. The session is closed on every path.
pub fn fetch_logs<C: Connector>(
    connector: &C,
    target: &DeploymentTarget,
    lines: usize,
) -> HoistResult<LogFetch> {
    let mut session = connector.connect(target)?;
    let result = session.run(&journal_command(&target.service_name, lines));
    session.close();

    let output = result?;
    tracing::debug!(exit_code = output.exit_code, "journal fetched");
    Ok(LogFetch {
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.exit_code,
    })
}
