//! Configuration file type definitions
//!
//! These mirror `hoist.toml` one-to-one. Optional fields are resolved into a
//! [`DeploymentTarget`](super::DeploymentTarget) by the loader.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::HoistResult;

use super::loader::{self, ConfigWarning};

/// SSH connection settings (`[target]`)
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub host: String,

    #[serde(default = "default_ssh_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// How the remote session authenticates (`[target.auth]`)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub method: AuthMethod,

    /// Private key for `method = "key"`
    #[serde(default)]
    pub identity_file: Option<PathBuf>,

    /// Name of the environment variable holding the password for `method = "password"`
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

/// Authentication method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Whatever the local ssh agent / ssh config offers
    #[default]
    Agent,
    /// A specific private key file
    Key,
    /// Password from the environment, fed through `sshpass`
    Password,
}

/// Application settings (`[app]`)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub service_name: String,

    pub domain: String,

    #[serde(default = "default_app_port")]
    pub port: u16,

    /// Defaults to `/opt/<service_name>`
    #[serde(default)]
    pub remote_root: Option<String>,

    /// Defaults to `<service_name> web application`
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_user")]
    pub run_as: String,

    #[serde(default = "default_install_command")]
    pub install_command: String,

    #[serde(default = "default_build_command")]
    pub build_command: String,

    #[serde(default = "default_start_command")]
    pub start_command: String,

    /// Uploaded next to the app when it exists locally; `""` disables it
    #[serde(default = "default_env_file")]
    pub env_file: String,

    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

/// Archive settings (`[package]`)
#[derive(Debug, Clone, Deserialize)]
pub struct PackageConfig {
    /// Relative paths resolve against the config file's directory
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Defaults to `<service_name>.zip`
    #[serde(default)]
    pub archive_name: Option<String>,

    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    #[serde(default)]
    pub exclude_files: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            archive_name: None,
            exclude_dirs: default_exclude_dirs(),
            exclude_files: Vec::new(),
        }
    }
}

/// TLS certificate settings (`[certificate]`)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CertificateConfig {
    /// ACME account contact; issuance runs without one when unset
    #[serde(default)]
    pub email: Option<String>,
}

/// Log fetcher settings (`[logs]`)
#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_lines")]
    pub lines: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            lines: default_log_lines(),
        }
    }
}

/// Main configuration structure (`hoist.toml`)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub target: TargetConfig,

    pub app: AppConfig,

    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub certificate: CertificateConfig,

    #[serde(default)]
    pub logs: LogsConfig,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> HoistResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> HoistResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Parse configuration from an in-memory TOML document
    pub fn from_toml_str(content: &str, origin: &Path) -> HoistResult<(Self, Vec<ConfigWarning>)> {
        loader::parse_with_warnings(content, origin)
    }
}

pub(crate) const DEFAULT_ENV_FILE: &str = ".env.local";

fn default_ssh_port() -> u16 {
    22
}

fn default_user() -> String {
    "root".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_password_env() -> String {
    "HOIST_SSH_PASSWORD".to_string()
}

fn default_app_port() -> u16 {
    3000
}

fn default_install_command() -> String {
    "npm install --production".to_string()
}

fn default_build_command() -> String {
    "npm run build".to_string()
}

fn default_start_command() -> String {
    "/usr/bin/npm start".to_string()
}

fn default_env_file() -> String {
    DEFAULT_ENV_FILE.to_string()
}

fn default_settle_secs() -> u64 {
    3
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude_dirs() -> Vec<String> {
    vec![
        ".next".to_string(),
        "node_modules".to_string(),
        ".git".to_string(),
    ]
}

fn default_log_lines() -> usize {
    50
}
