//! Configuration loading, environment overrides and resolution

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HoistError, HoistResult};

use super::target::{Credential, DeploymentTarget, Secret};
use super::types::{AuthMethod, ConfigFile};
use super::validate::validate_target;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> HoistResult<(ConfigFile, Vec<ConfigWarning>)> {
    if !path.exists() {
        return Err(HoistError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_with_warnings(&content, path)
}

pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> HoistResult<(ConfigFile, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: ConfigFile = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| HoistError::ConfigParse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Apply environment variable overrides (HOIST_* prefix)
pub fn with_env_overrides(
    mut config: ConfigFile,
    get_env: impl Fn(&str) -> Option<String>,
) -> HoistResult<ConfigFile> {
    if let Some(host) = get_env("HOIST_HOST") {
        config.target.host = host;
    }

    if let Some(port) = get_env("HOIST_PORT") {
        config.target.port = port
            .trim()
            .parse()
            .map_err(|_| HoistError::invalid_config("HOIST_PORT", &port, "not a port number"))?;
    }

    if let Some(user) = get_env("HOIST_USER") {
        config.target.user = user;
    }

    if let Some(identity) = get_env("HOIST_IDENTITY_FILE") {
        config.target.auth.method = AuthMethod::Key;
        config.target.auth.identity_file = Some(PathBuf::from(identity));
    }

    if let Some(domain) = get_env("HOIST_DOMAIN") {
        config.app.domain = domain;
    }

    Ok(config)
}

/// Turn a parsed config into a validated [`DeploymentTarget`].
///
/// `base_dir` is the directory holding the config file; relative source
/// directories resolve against it. Secrets come from `get_env` only.
pub fn resolve(
    config: ConfigFile,
    base_dir: &Path,
    get_env: impl Fn(&str) -> Option<String>,
) -> HoistResult<DeploymentTarget> {
    let config = with_env_overrides(config, &get_env)?;
    let ConfigFile {
        target,
        app,
        package,
        certificate,
        logs,
    } = config;

    let credential = match target.auth.method {
        AuthMethod::Agent => Credential::Agent,
        AuthMethod::Key => {
            let identity = target.auth.identity_file.ok_or_else(|| {
                HoistError::invalid_config(
                    "target.auth.identity_file",
                    "",
                    "required when method = \"key\"",
                )
            })?;
            Credential::IdentityFile(expand_home(&identity))
        }
        AuthMethod::Password => {
            let var = target.auth.password_env;
            let password = get_env(&var)
                .filter(|p| !p.is_empty())
                .ok_or(HoistError::MissingSecret { var })?;
            Credential::Password(Secret::new(password))
        }
    };

    let source_dir = if package.source_dir.is_absolute() {
        package.source_dir
    } else {
        base_dir.join(package.source_dir)
    };

    let remote_root = app
        .remote_root
        .unwrap_or_else(|| format!("/opt/{}", app.service_name));
    let description = app
        .description
        .unwrap_or_else(|| format!("{} web application", app.service_name));
    let archive_name = package
        .archive_name
        .unwrap_or_else(|| format!("{}.zip", app.service_name));
    let env_file = Some(app.env_file).filter(|f| !f.is_empty());

    let resolved = DeploymentTarget {
        host: target.host,
        port: target.port,
        user: target.user,
        credential,
        connect_timeout: Duration::from_secs(target.connect_timeout_secs),
        remote_root,
        domain: app.domain,
        app_port: app.port,
        service_name: app.service_name,
        description,
        run_as: app.run_as,
        install_command: app.install_command,
        build_command: app.build_command,
        start_command: app.start_command,
        settle_delay: Duration::from_secs(app.settle_secs),
        source_dir,
        archive_name,
        env_file,
        exclude_dirs: package.exclude_dirs,
        exclude_files: package.exclude_files,
        certificate_email: certificate.email,
        log_lines: logs.lines,
    };

    validate_target(&resolved)?;
    Ok(resolved)
}

/// Load, override and resolve in one go, reading the process environment.
pub fn load_target(path: &Path) -> HoistResult<(DeploymentTarget, Vec<ConfigWarning>)> {
    let (config, warnings) = load_with_warnings(path)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let target = resolve(config, base_dir, |key| std::env::var(key).ok())?;
    Ok((target, warnings))
}

fn expand_home(path: &Path) -> PathBuf {
    let p = path.to_string_lossy();
    if let Some(rest) = p.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "target",
        "host",
        "port",
        "user",
        "connect_timeout_secs",
        "auth",
        "method",
        "identity_file",
        "password_env",
        "app",
        "service_name",
        "domain",
        "remote_root",
        "description",
        "run_as",
        "install_command",
        "build_command",
        "start_command",
        "env_file",
        "settle_secs",
        "package",
        "source_dir",
        "archive_name",
        "exclude_dirs",
        "exclude_files",
        "certificate",
        "email",
        "logs",
        "lines",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 && dist > 0 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
