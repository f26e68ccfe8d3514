//! Argument lists for the OpenSSH client tools
//!
//! Kept free of process spawning so the exact flags can be tested.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::{Credential, DeploymentTarget};

#[derive(Debug, Clone)]
pub(crate) struct SshArgs {
    port: u16,
    destination: String,
    /// `user@host` with IPv6 literals bracketed; scp splits on the first `:`
    copy_destination: String,
    control_path: PathBuf,
    connect_timeout_secs: u64,
    credential: Credential,
}

impl SshArgs {
    pub fn new(target: &DeploymentTarget, control_path: &Path) -> Self {
        Self {
            port: target.port,
            destination: target.destination(),
            copy_destination: copy_destination(&target.user, &target.host),
            control_path: control_path.to_path_buf(),
            connect_timeout_secs: target.connect_timeout.as_secs().max(1),
            credential: target.credential.clone(),
        }
    }

    fn opt(args: &mut Vec<OsString>, value: impl Into<OsString>) {
        args.push("-o".into());
        args.push(value.into());
    }

    /// Options shared by every invocation; trust-on-first-use host keys.
    fn common(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        Self::opt(&mut args, "StrictHostKeyChecking=accept-new");
        Self::opt(&mut args, format!("ConnectTimeout={}", self.connect_timeout_secs));
        Self::opt(&mut args, "LogLevel=ERROR");
        let mut control = OsString::from("ControlPath=");
        control.push(self.control_path.as_os_str());
        args.push("-o".into());
        args.push(control);
        args
    }

    fn auth(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        match &self.credential {
            Credential::Agent => {
                Self::opt(&mut args, "BatchMode=yes");
            }
            Credential::IdentityFile(path) => {
                Self::opt(&mut args, "BatchMode=yes");
                Self::opt(&mut args, "IdentitiesOnly=yes");
                args.push("-i".into());
                args.push(path.as_os_str().to_owned());
            }
            Credential::Password(_) => {
                Self::opt(&mut args, "PreferredAuthentications=password,keyboard-interactive");
                Self::opt(&mut args, "PubkeyAuthentication=no");
                Self::opt(&mut args, "NumberOfPasswordPrompts=1");
            }
        }
        args
    }

    /// Start the multiplexing master in the background once authenticated.
    pub fn master(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-M".into(), "-N".into(), "-f".into()];
        args.extend(self.common());
        Self::opt(&mut args, "ControlMaster=yes");
        // Master exits by itself after ten idle minutes
        Self::opt(&mut args, "ControlPersist=600");
        Self::opt(&mut args, "ServerAliveInterval=15");
        args.extend(self.auth());
        args.push("-p".into());
        args.push(self.port.to_string().into());
        args.push(self.destination.clone().into());
        args
    }

    /// Run one command over the master connection.
    pub fn exec(&self, command: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-T".into()];
        args.extend(self.common());
        Self::opt(&mut args, "ControlMaster=no");
        Self::opt(&mut args, "BatchMode=yes");
        args.push("-p".into());
        args.push(self.port.to_string().into());
        args.push(self.destination.clone().into());
        args.push(command.into());
        args
    }

    /// Send a control request (`check`, `exit`) to the master.
    pub fn control(&self, request: &str) -> Vec<OsString> {
        let mut args = self.common();
        args.push("-O".into());
        args.push(request.into());
        args.push("-p".into());
        args.push(self.port.to_string().into());
        args.push(self.destination.clone().into());
        args
    }

    /// Copy one file over the master connection.
    pub fn scp(&self, local: &Path, remote: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-q".into()];
        args.extend(self.common());
        Self::opt(&mut args, "ControlMaster=no");
        Self::opt(&mut args, "BatchMode=yes");
        args.push("-P".into());
        args.push(self.port.to_string().into());
        args.push(local.as_os_str().to_owned());
        args.push(format!("{}:{}", self.copy_destination, remote).into());
        args
    }
}

fn copy_destination(user: &str, host: &str) -> String {
    if host.contains(':') {
        format!("{}@[{}]", user, host)
    } else {
        format!("{}@{}", user, host)
    }
}
