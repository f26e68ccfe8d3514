//! Test environment builder for isolated Hoist testing.
//!
//! Provides `TestEnv` - a temp project directory, a private `bin/` directory
//! that is put first on `PATH`, and helpers to run the `hoist` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use super::fixtures::{INDEX_JS, PACKAGE_JSON};

/// Variables that would leak the developer's own setup into a test run
const SCRUBBED_ENV: &[&str] = &[
    "HOIST_HOST",
    "HOIST_PORT",
    "HOIST_USER",
    "HOIST_IDENTITY_FILE",
    "HOIST_DOMAIN",
    "HOIST_LOG",
    "HOIST_SSH_PASSWORD",
    "SSHPASS",
];

/// Result of running a Hoist CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with temp directories.
pub struct TestEnv {
    /// Temporary directory for the project (also the working directory)
    pub project_root: TempDir,
    /// Directory prepended to PATH, for fake remote clients
    pub bin_dir: TempDir,
    hoist_bin: PathBuf,
}

impl TestEnv {
    /// Empty project
    pub fn new() -> Self {
        Self {
            project_root: tempfile::tempdir().expect("Failed to create project dir"),
            bin_dir: tempfile::tempdir().expect("Failed to create bin dir"),
            hoist_bin: PathBuf::from(env!("CARGO_BIN_EXE_hoist")),
        }
    }

    /// A small Node project with `config` as `hoist.toml`
    pub fn with_project(config: &str) -> Self {
        let env = Self::new();
        env.write_project_file("hoist.toml", config);
        env.write_project_file("package.json", PACKAGE_JSON);
        env.write_project_file("src/index.js", INDEX_JS);
        env
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        let full_path = self.project_path(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    /// Where fake clients append the command lines they receive
    pub fn remote_log_path(&self) -> PathBuf {
        self.bin_dir.path().join("remote.log")
    }

    /// Everything the fake clients were asked to do, in order
    pub fn remote_log(&self) -> String {
        std::fs::read_to_string(self.remote_log_path()).unwrap_or_default()
    }

    /// Run hoist in this environment from project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run hoist from project root with extra env vars.
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let path = match std::env::var_os("PATH") {
            Some(existing) => {
                let mut dirs = vec![self.bin_dir.path().to_path_buf()];
                dirs.extend(std::env::split_paths(&existing));
                std::env::join_paths(dirs).expect("PATH entries are joinable")
            }
            None => self.bin_dir.path().as_os_str().to_owned(),
        };

        let mut cmd = Command::new(&self.hoist_bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("PATH", path)
            .env("NO_COLOR", "1")
            .env("LANG", "C")
            .env("LC_ALL", "C")
            .env("HOIST_FAKE_LOG", self.remote_log_path());
        for key in SCRUBBED_ENV {
            cmd.env_remove(key);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute hoist");
        output_to_result(output)
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Assert that `path` does not exist, listing its directory if it does.
pub fn assert_absent(path: &Path) {
    assert!(
        !path.exists(),
        "Expected '{}' to be gone. Directory contains: {:?}",
        path.display(),
        path.parent()
            .and_then(|p| std::fs::read_dir(p).ok())
            .map(|entries| entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect::<Vec<_>>())
    );
}
