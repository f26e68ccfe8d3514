//! Deploy Result
//!
//! What a pipeline run did, stage by stage, and how it ended.

use crate::domain::value_objects::{DeploySummary, StageId, StageStatus};
use crate::infrastructure::ArchiveStats;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Conventional status for termination by SIGINT
pub const EXIT_CANCELLED: i32 = 130;

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Every stage was reached; advisory failures are listed in the summary
    Completed(DeploySummary),
    /// A fatal stage failed
    Aborted { stage: StageId, reason: String },
    /// The operator interrupted the run
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct DeployReport {
    stages: [StageStatus; StageId::ALL.len()],
    pub outcome: DeployOutcome,
    pub archive: Option<ArchiveStats>,
}

impl DeployReport {
    pub(crate) fn new(
        stages: [StageStatus; StageId::ALL.len()],
        outcome: DeployOutcome,
        archive: Option<ArchiveStats>,
    ) -> Self {
        Self {
            stages,
            outcome,
            archive,
        }
    }

    pub fn status(&self, stage: StageId) -> StageStatus {
        self.stages[stage.number() - 1]
    }

    /// Every stage with its status, in execution order
    pub fn stages(&self) -> impl Iterator<Item = (StageId, StageStatus)> + '_ {
        StageId::ALL.iter().map(|s| (*s, self.status(*s)))
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DeployOutcome::Completed(_))
    }

    /// Only fatal failures and interruption change the exit status.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            DeployOutcome::Completed(_) => EXIT_SUCCESS,
            DeployOutcome::Aborted { .. } => EXIT_FAILURE,
            DeployOutcome::Cancelled => EXIT_CANCELLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: DeployOutcome) -> DeployReport {
        DeployReport::new([StageStatus::NotRun; 12], outcome, None)
    }

    #[test]
    fn exit_codes() {
        assert_eq!(report(DeployOutcome::Cancelled).exit_code(), 130);
        assert_eq!(
            report(DeployOutcome::Aborted {
                stage: StageId::Build,
                reason: "build failed".to_string()
            })
            .exit_code(),
            1
        );
    }

    #[test]
    fn status_is_indexed_by_stage() {
        let mut stages = [StageStatus::NotRun; 12];
        stages[StageId::Certificate.number() - 1] = StageStatus::Skipped;
        let report = DeployReport::new(stages, DeployOutcome::Cancelled, None);
        assert_eq!(report.status(StageId::Certificate), StageStatus::Skipped);
        assert_eq!(report.stages().count(), 12);
    }
}
