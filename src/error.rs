//! Error types for Hoist
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Hoist operations
pub type HoistResult<T> = Result<T, HoistError>;

/// Main error type for Hoist operations
#[derive(Error, Debug)]
pub enum HoistError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive could not be written
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Source tree could not be walked (permission denied, broken entry, ...)
    #[error("cannot read {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Configuration file does not exist
    #[error("config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file is not valid TOML or has wrong types
    #[error("invalid config in {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// A configuration value failed validation
    #[error("invalid value for '{field}' ({value:?}): {reason}")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    /// A secret expected in the environment is missing
    #[error("environment variable {var} is not set (required for password authentication)")]
    MissingSecret { var: String },

    /// The remote host rejected our credentials
    #[error("authentication failed for {host}: {detail}")]
    Authentication { host: String, detail: String },

    /// The remote host could not be reached
    #[error("cannot connect to {host}: {detail}")]
    Connection { host: String, detail: String },

    /// The established remote channel broke mid-run
    #[error("remote channel failure: {detail}")]
    Channel { detail: String },

    /// A file transfer failed
    #[error("upload of {local} to {remote} failed: {detail}")]
    Upload {
        local: PathBuf,
        remote: String,
        detail: String,
    },
}

impl HoistError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Authentication or channel errors end the run; they are never advisory.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Connection { .. } | Self::Channel { .. }
        )
    }
}
