//! Step Runner
//!
//! Runs one named remote command, reports it through the event sink and
//! hands the outcome back. Never returns an error: transport failures are
//! folded into the [`StepResult`] so each stage can apply its own policy.

use crate::domain::ports::{DeployEvent, DeployEventSink, RemoteSession};

/// A single remote action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub command: String,
    pub description: String,
    /// Include stdout in the success event
    pub show_output: bool,
}

impl Step {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
            show_output: false,
        }
    }

    pub fn with_output(mut self) -> Self {
        self.show_output = true;
        self
    }
}

/// Outcome of one [`Step`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepResult {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    /// Remote exit status, `-1` if none was received
    pub exit_code: i32,
    /// The session itself broke; nothing else can run on it
    pub channel_failure: bool,
}

impl StepResult {
    /// Text explaining a failure: stderr, else stdout, else the exit code.
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exit code {}", self.exit_code)
    }
}

pub fn run_step<S>(session: &mut S, sink: &dyn DeployEventSink, step: &Step) -> StepResult
where
    S: RemoteSession + ?Sized,
{
    sink.on_event(DeployEvent::StepStarted {
        description: step.description.clone(),
    });

    let result = match session.run(&step.command) {
        Ok(output) => StepResult {
            succeeded: output.success(),
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code,
            channel_failure: false,
        },
        Err(e) => StepResult {
            succeeded: false,
            stdout: String::new(),
            stderr: e.to_string(),
            exit_code: -1,
            channel_failure: true,
        },
    };

    if result.succeeded {
        let output = Some(result.stdout.trim())
            .filter(|out| step.show_output && !out.is_empty())
            .map(str::to_string);
        sink.on_event(DeployEvent::StepSucceeded {
            description: step.description.clone(),
            output,
        });
    } else {
        tracing::debug!(
            description = %step.description,
            exit_code = result.exit_code,
            channel_failure = result.channel_failure,
            "step failed"
        );
        sink.on_event(DeployEvent::StepFailed {
            description: step.description.clone(),
            detail: result.failure_detail(),
        });
    }

    result
}
