//! Resolved, validated deployment target
//!
//! Built once at startup by [`resolve`](super::resolve) and passed by
//! reference everywhere else. Nothing in here is ever derived from remote
//! output.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A secret value that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret. Callers must hand it straight to the child process
    /// environment and nowhere else.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// How the remote session proves its identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Defer to the ssh agent and `~/.ssh/config`
    Agent,
    /// Use this private key
    IdentityFile(PathBuf),
    /// Password injected from the environment
    Password(Secret),
}

impl Credential {
    pub fn label(&self) -> &'static str {
        match self {
            Credential::Agent => "ssh agent",
            Credential::IdentityFile(_) => "identity file",
            Credential::Password(_) => "password (env)",
        }
    }
}

/// Immutable description of the one host and app a run deploys to.
#[derive(Debug, Clone)]
pub struct DeploymentTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credential: Credential,
    pub connect_timeout: Duration,

    pub remote_root: String,
    pub domain: String,
    pub app_port: u16,
    pub service_name: String,
    pub description: String,
    pub run_as: String,
    pub install_command: String,
    pub build_command: String,
    pub start_command: String,
    pub settle_delay: Duration,

    pub source_dir: PathBuf,
    pub archive_name: String,
    /// File name inside `source_dir`; `None` disables the upload
    pub env_file: Option<String>,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,

    pub certificate_email: Option<String>,
    pub log_lines: usize,
}

impl DeploymentTarget {
    /// `user@host` for ssh/scp
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Local path of the archive (inside the source tree, always excluded from itself)
    pub fn archive_path(&self) -> PathBuf {
        self.source_dir.join(&self.archive_name)
    }

    pub fn remote_archive_path(&self) -> String {
        format!("{}/{}", self.remote_root, self.archive_name)
    }

    pub fn local_env_file(&self) -> Option<PathBuf> {
        self.env_file.as_ref().map(|name| self.source_dir.join(name))
    }

    pub fn remote_env_file(&self) -> Option<String> {
        self.env_file
            .as_ref()
            .map(|name| format!("{}/{}", self.remote_root, name))
    }

    pub fn unit_path(&self) -> String {
        format!("/etc/systemd/system/{}.service", self.service_name)
    }

    pub fn site_available_path(&self) -> String {
        format!("/etc/nginx/sites-available/{}", self.service_name)
    }

    pub fn site_enabled_path(&self) -> String {
        format!("/etc/nginx/sites-enabled/{}", self.service_name)
    }

    /// Excluded file names, with the archive itself always among them
    pub fn effective_exclude_files(&self) -> Vec<String> {
        let mut files = self.exclude_files.clone();
        if !files.iter().any(|f| f == &self.archive_name) {
            files.push(self.archive_name.clone());
        }
        files
    }
}
