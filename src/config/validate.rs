//! Safe-character validation for values interpolated into remote shell
//! commands and generated config files.
//!
//! Templates are rendered by plain substitution, so every field that ends up
//! in a command line or heredoc must be checked here first.

use crate::error::{HoistError, HoistResult};

use super::DeploymentTarget;

/// Validate every interpolated field of a resolved target.
pub fn validate_target(target: &DeploymentTarget) -> HoistResult<()> {
    validate_host("target.host", &target.host)?;
    validate_word("target.user", &target.user)?;
    validate_domain("app.domain", &target.domain)?;
    validate_word("app.service_name", &target.service_name)?;
    validate_word("app.run_as", &target.run_as)?;
    validate_remote_root("app.remote_root", &target.remote_root)?;
    validate_file_name("package.archive_name", &target.archive_name)?;
    if !target.archive_name.ends_with(".zip") {
        return Err(HoistError::invalid_config(
            "package.archive_name",
            &target.archive_name,
            "must end with .zip",
        ));
    }
    if let Some(env_file) = &target.env_file {
        validate_file_name("app.env_file", env_file)?;
    }
    if let Some(email) = &target.certificate_email {
        validate_email("certificate.email", email)?;
    }
    validate_single_line("app.description", &target.description)?;
    validate_single_line("app.install_command", &target.install_command)?;
    validate_single_line("app.build_command", &target.build_command)?;
    validate_single_line("app.start_command", &target.start_command)?;
    if target.port == 0 {
        return Err(HoistError::invalid_config("target.port", "0", "must be non-zero"));
    }
    if target.app_port == 0 {
        return Err(HoistError::invalid_config("app.port", "0", "must be non-zero"));
    }
    Ok(())
}

fn non_empty(field: &str, value: &str) -> HoistResult<()> {
    if value.is_empty() {
        return Err(HoistError::invalid_config(field, value, "must not be empty"));
    }
    Ok(())
}

fn reject_char(field: &str, value: &str, c: char) -> HoistError {
    HoistError::invalid_config(field, value, format!("unexpected character {:?}", c))
}

fn check_chars(field: &str, value: &str, allowed: impl Fn(char) -> bool) -> HoistResult<()> {
    non_empty(field, value)?;
    if let Some(c) = value.chars().find(|c| !allowed(*c)) {
        return Err(reject_char(field, value, c));
    }
    if value.starts_with('-') {
        return Err(HoistError::invalid_config(
            field,
            value,
            "must not start with '-'",
        ));
    }
    Ok(())
}

/// Hostname, IPv4 or IPv6 literal
pub fn validate_host(field: &str, value: &str) -> HoistResult<()> {
    check_chars(field, value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':')
    })
}

/// User and unit names: `[A-Za-z0-9._@-]`
pub fn validate_word(field: &str, value: &str) -> HoistResult<()> {
    check_chars(field, value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@')
    })
}

/// DNS name: dot-separated labels of `[A-Za-z0-9-]`, no empty labels
pub fn validate_domain(field: &str, value: &str) -> HoistResult<()> {
    check_chars(field, value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '-')
    })?;
    for label in value.split('.') {
        if label.is_empty() {
            return Err(HoistError::invalid_config(field, value, "empty label"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(HoistError::invalid_config(
                field,
                value,
                "labels must not start or end with '-'",
            ));
        }
        if label.len() > 63 {
            return Err(HoistError::invalid_config(
                field,
                value,
                "label longer than 63 characters",
            ));
        }
    }
    Ok(())
}

/// Absolute POSIX path of `[A-Za-z0-9/._-]` without `..` or a trailing slash
pub fn validate_remote_root(field: &str, value: &str) -> HoistResult<()> {
    check_chars(field, value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-')
    })?;
    if !value.starts_with('/') {
        return Err(HoistError::invalid_config(field, value, "must be absolute"));
    }
    if value == "/" || value.ends_with('/') {
        return Err(HoistError::invalid_config(
            field,
            value,
            "must name a directory below / without a trailing slash",
        ));
    }
    if value.split('/').any(|seg| seg == "..") {
        return Err(HoistError::invalid_config(field, value, "must not contain '..'"));
    }
    Ok(())
}

/// Bare file name of `[A-Za-z0-9._-]`
pub fn validate_file_name(field: &str, value: &str) -> HoistResult<()> {
    check_chars(field, value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
    })?;
    if value == "." || value == ".." {
        return Err(HoistError::invalid_config(field, value, "not a file name"));
    }
    Ok(())
}

pub fn validate_email(field: &str, value: &str) -> HoistResult<()> {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(HoistError::invalid_config(field, value, "missing '@'"));
    };
    check_chars(field, local, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
    })
    .map_err(|_| HoistError::invalid_config(field, value, "invalid local part"))?;
    validate_domain(field, domain)
}

/// Operator-authored text: anything printable on one line
pub fn validate_single_line(field: &str, value: &str) -> HoistResult<()> {
    non_empty(field, value)?;
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(reject_char(field, value, c));
    }
    Ok(())
}
