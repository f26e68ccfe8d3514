//! Pipeline stages and their failure policy

use std::fmt;

/// What a failed stage does to the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePolicy {
    /// Stop; run nothing after this stage
    Fatal,
    /// Log and carry on
    Advisory,
}

/// The fixed, ordered stages of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageId {
    BuildArchive,
    Connect,
    PreChecks,
    PrepareDirectory,
    Upload,
    Extract,
    InstallDependencies,
    Build,
    ConfigureService,
    ConfigureProxy,
    Certificate,
    Verify,
}

impl StageId {
    /// All stages in execution order
    pub const ALL: [StageId; 12] = [
        StageId::BuildArchive,
        StageId::Connect,
        StageId::PreChecks,
        StageId::PrepareDirectory,
        StageId::Upload,
        StageId::Extract,
        StageId::InstallDependencies,
        StageId::Build,
        StageId::ConfigureService,
        StageId::ConfigureProxy,
        StageId::Certificate,
        StageId::Verify,
    ];

    /// 1-based position in [`StageId::ALL`]
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn title(&self) -> &'static str {
        match self {
            StageId::BuildArchive => "Packaging project",
            StageId::Connect => "Connecting to server",
            StageId::PreChecks => "Pre-deployment checks",
            StageId::PrepareDirectory => "Preparing remote directory",
            StageId::Upload => "Uploading project files",
            StageId::Extract => "Extracting files",
            StageId::InstallDependencies => "Installing dependencies",
            StageId::Build => "Building application",
            StageId::ConfigureService => "Configuring systemd service",
            StageId::ConfigureProxy => "Configuring nginx",
            StageId::Certificate => "Configuring TLS certificate",
            StageId::Verify => "Verifying deployment",
        }
    }

    pub fn policy(&self) -> StagePolicy {
        match self {
            StageId::BuildArchive | StageId::Connect | StageId::Upload | StageId::Build => {
                StagePolicy::Fatal
            }
            _ => StagePolicy::Advisory,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.policy() == StagePolicy::Fatal
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Succeeded,
    Failed,
    /// Deliberately not executed (e.g. certificate tool missing)
    Skipped,
    /// Never reached because the run stopped earlier
    NotRun,
}
