//! Deploy Event Port
//!
//! Provides an observable interface for deploy operations.
//! The console renderer, tests and anything else that wants progress
//! subscribe through [`DeployEventSink`].

use std::path::PathBuf;

use crate::domain::value_objects::{DeploySummary, StageId, StageStatus};

/// Severity of a free-form notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

/// Event emitted during deploy operations
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Deploy started
    Started {
        host: String,
        domain: String,
        app_port: u16,
        remote_root: String,
    },

    /// The local archive was written
    ArchiveBuilt {
        path: PathBuf,
        file_count: usize,
        archive_bytes: u64,
    },

    /// A stage began
    StageStarted { stage: StageId },

    /// A stage ended (or was skipped)
    StageFinished { stage: StageId, status: StageStatus },

    /// A remote step is about to run
    StepStarted { description: String },

    /// A remote step exited 0; `output` is set only when the caller asked for it
    StepSucceeded {
        description: String,
        output: Option<String>,
    },

    /// A remote step failed
    StepFailed { description: String, detail: String },

    /// Anything else worth telling the operator
    Notice { level: NoticeLevel, message: String },

    /// A fatal stage failed; nothing after it runs
    Aborted { stage: StageId, reason: String },

    /// The operator interrupted the run
    Cancelled,

    /// All stages ran
    Completed { summary: DeploySummary },

    /// The remote session was released
    SessionClosed,

    /// The local archive was deleted
    ArchiveRemoved { path: PathBuf },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress display in terminal
/// - NoopEventSink: Silent operation
pub trait DeployEventSink {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {
        // Do nothing
    }
}
