//! OpenSSH-backed remote session
//!
//! Shells out to the system `ssh`/`scp` binaries. `connect` authenticates
//! once by starting a ControlMaster in a private temp directory; every
//! command and upload afterwards rides on that master, so the run uses a
//! single authenticated connection. Password credentials go through
//! `sshpass -e` with the secret in the child environment only.

mod args;

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

use crate::config::{Credential, DeploymentTarget};
use crate::domain::ports::{CommandOutput, Connector, RemoteSession};
use crate::error::{HoistError, HoistResult};

use args::SshArgs;

/// Exit status OpenSSH uses for its own failures
const SSH_ERROR_EXIT: i32 = 255;

/// `sshpass` exit status for a rejected password
const SSHPASS_BAD_PASSWORD_EXIT: i32 = 5;

const AUTH_FAILURE_MARKERS: &[&str] = &[
    "Permission denied",
    "Authentication failed",
    "Too many authentication failures",
    "No supported authentication methods",
    "no supported authentication methods",
];

/// Opens [`OpenSshSession`]s using the system OpenSSH client.
#[derive(Debug, Clone)]
pub struct OpenSshConnector {
    ssh_program: String,
    scp_program: String,
    sshpass_program: String,
}

impl Default for OpenSshConnector {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            sshpass_program: "sshpass".to_string(),
        }
    }
}

impl OpenSshConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use different client binaries (absolute paths or names on `PATH`).
    pub fn with_programs(
        ssh: impl Into<String>,
        scp: impl Into<String>,
        sshpass: impl Into<String>,
    ) -> Self {
        Self {
            ssh_program: ssh.into(),
            scp_program: scp.into(),
            sshpass_program: sshpass.into(),
        }
    }

    fn launcher(&self, is_password: bool) -> &str {
        if is_password {
            &self.sshpass_program
        } else {
            &self.ssh_program
        }
    }

    fn master_command(&self, target: &DeploymentTarget, args: &SshArgs) -> Command {
        let mut cmd = match &target.credential {
            Credential::Password(secret) => {
                let mut cmd = Command::new(&self.sshpass_program);
                cmd.arg("-e").arg(&self.ssh_program);
                cmd.env("SSHPASS", secret.expose());
                cmd
            }
            Credential::Agent | Credential::IdentityFile(_) => Command::new(&self.ssh_program),
        };
        cmd.args(args.master());
        cmd
    }
}

impl Connector for OpenSshConnector {
    type Session = OpenSshSession;

    fn connect(&self, target: &DeploymentTarget) -> HoistResult<OpenSshSession> {
        let control_dir = tempfile::Builder::new().prefix("hoist-ssh-").tempdir()?;
        let control_path = control_dir.path().join("ctl");
        let stderr_path = control_dir.path().join("master.err");
        let args = SshArgs::new(target, &control_path);
        let is_password = matches!(target.credential, Credential::Password(_));

        tracing::debug!(
            destination = %target.destination(),
            port = target.port,
            auth = target.credential.label(),
            "opening ssh master"
        );

        // The backgrounded master keeps stderr open; a file avoids blocking on a pipe.
        let status = self
            .master_command(target, &args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(File::create(&stderr_path)?)
            .status()
            .map_err(|e| launch_error(&target.host, self.launcher(is_password), e))?;

        if !status.success() {
            let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(classify_connect_failure(
                &target.host,
                status.code(),
                &stderr,
                is_password,
            ));
        }

        Ok(OpenSshSession {
            host: target.host.clone(),
            ssh_program: self.ssh_program.clone(),
            scp_program: self.scp_program.clone(),
            args,
            control_dir: Some(control_dir),
        })
    }
}

/// A live ControlMaster connection. Closed on drop if not closed earlier.
#[derive(Debug)]
pub struct OpenSshSession {
    host: String,
    ssh_program: String,
    scp_program: String,
    args: SshArgs,
    /// Holds the control socket; `None` once closed
    control_dir: Option<TempDir>,
}

impl OpenSshSession {
    fn ensure_open(&self) -> HoistResult<()> {
        if self.control_dir.is_none() {
            return Err(HoistError::Channel {
                detail: format!("session to {} is closed", self.host),
            });
        }
        Ok(())
    }

    /// Ask the master whether it is still running.
    fn master_alive(&self) -> bool {
        Command::new(&self.ssh_program)
            .args(self.args.control("check"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn lost_channel(&self, stderr: &str) -> HoistError {
        let detail = last_line(stderr)
            .map(str::to_string)
            .unwrap_or_else(|| format!("connection to {} lost", self.host));
        HoistError::Channel { detail }
    }
}

impl RemoteSession for OpenSshSession {
    fn run(&mut self, command: &str) -> HoistResult<CommandOutput> {
        self.ensure_open()?;
        tracing::debug!(command, "remote exec");

        let output = Command::new(&self.ssh_program)
            .args(self.args.exec(command))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| HoistError::Channel {
                detail: format!("failed to run {}: {}", self.ssh_program, e),
            })?;

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        // 255 is also a legitimate remote exit status; only a dead master is a channel failure.
        if result.exit_code == SSH_ERROR_EXIT && !self.master_alive() {
            return Err(self.lost_channel(&result.stderr));
        }

        tracing::trace!(exit_code = result.exit_code, "remote exec finished");
        Ok(result)
    }

    fn upload(&mut self, local_path: &Path, remote_path: &str) -> HoistResult<()> {
        self.ensure_open()?;
        if !local_path.is_file() {
            return Err(HoistError::Upload {
                local: local_path.to_path_buf(),
                remote: remote_path.to_string(),
                detail: "local file does not exist".to_string(),
            });
        }
        tracing::debug!(local = %local_path.display(), remote = remote_path, "upload");

        let output = Command::new(&self.scp_program)
            .args(self.args.scp(local_path, remote_path))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| HoistError::Upload {
                local: local_path.to_path_buf(),
                remote: remote_path.to_string(),
                detail: format!("failed to run {}: {}", self.scp_program, e),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !self.master_alive() {
            return Err(self.lost_channel(&stderr));
        }
        Err(HoistError::Upload {
            local: local_path.to_path_buf(),
            remote: remote_path.to_string(),
            detail: last_line(&stderr)
                .unwrap_or("scp exited with an error")
                .to_string(),
        })
    }

    fn close(&mut self) {
        let Some(control_dir) = self.control_dir.take() else {
            return;
        };
        let result = Command::new(&self.ssh_program)
            .args(self.args.control("exit"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = result {
            tracing::warn!(host = %self.host, error = %e, "could not stop ssh master");
        }
        tracing::debug!(host = %self.host, "session closed");
        drop(control_dir);
    }

    fn is_closed(&self) -> bool {
        self.control_dir.is_none()
    }
}

impl Drop for OpenSshSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn launch_error(host: &str, program: &str, e: io::Error) -> HoistError {
    let detail = if e.kind() == io::ErrorKind::NotFound {
        format!("'{}' not found on PATH", program)
    } else {
        format!("failed to run {}: {}", program, e)
    };
    HoistError::Connection {
        host: host.to_string(),
        detail,
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// Map a failed master start to an authentication or connection error.
pub(crate) fn classify_connect_failure(
    host: &str,
    exit_code: Option<i32>,
    stderr: &str,
    is_password: bool,
) -> HoistError {
    if is_password && exit_code == Some(SSHPASS_BAD_PASSWORD_EXIT) {
        return HoistError::Authentication {
            host: host.to_string(),
            detail: "password rejected".to_string(),
        };
    }

    if let Some(line) = stderr
        .lines()
        .find(|line| AUTH_FAILURE_MARKERS.iter().any(|m| line.contains(m)))
    {
        return HoistError::Authentication {
            host: host.to_string(),
            detail: line.trim().to_string(),
        };
    }

    let detail = match (last_line(stderr), exit_code) {
        (Some(line), _) => line.to_string(),
        (None, Some(code)) => format!("ssh exited with status {}", code),
        (None, None) => "ssh was terminated by a signal".to_string(),
    };
    HoistError::Connection {
        host: host.to_string(),
        detail,
    }
}
