//! Configuration module for Hoist
//!
//! Resolution order:
//! 1. Environment variables (HOIST_*), including secrets
//! 2. The config file (`hoist.toml` by default)
//! 3. Built-in defaults (lowest priority)
//!
//! The result is one immutable [`DeploymentTarget`] per run.

mod loader;
mod target;
mod types;
pub mod validate;

pub use loader::{load_target, resolve, with_env_overrides, ConfigWarning};
pub use target::{Credential, DeploymentTarget, Secret};
pub use types::{
    AppConfig, AuthConfig, AuthMethod, CertificateConfig, ConfigFile, LogsConfig, PackageConfig,
    TargetConfig,
};

#[cfg(test)]
pub(crate) use target::fixtures;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "hoist.toml";
