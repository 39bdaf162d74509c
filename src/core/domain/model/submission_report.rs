//! What the scheduler answers to an experiment submission.

use crate::{Draft, Experiment, SubmittedExperiment};
use serde::Deserialize;
use serde_json::Value;

/// The scheduler accepted a submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionReport {
    /// Id assigned to the new experiment.
    pub experiment: u64,
    /// Message from the scheduler.
    #[serde(default)]
    pub message: String,
    /// Number of nodes allocated.
    #[serde(default)]
    pub nodecount: u32,
    /// Time intervals allocated, in the scheduler's own shape.
    #[serde(default)]
    pub intervals: Vec<Value>,
}

/// Result of a submission.
///
/// Submitting consumes the draft. On acceptance it comes back as the
/// read-only [`SubmittedExperiment`]; on refusal the draft is handed back so
/// it can be corrected and submitted again.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted {
        experiment: SubmittedExperiment,
        report: SubmissionReport,
    },
    /// The scheduler could not allocate the request.
    Failed { draft: Draft, message: String },
}

impl SubmissionOutcome {
    /// The message to show the user, whichever way the submission went.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            SubmissionOutcome::Accepted { report, .. } => &report.message,
            SubmissionOutcome::Failed { message, .. } => message,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&SubmissionReport> {
        match self {
            SubmissionOutcome::Accepted { report, .. } => Some(report),
            SubmissionOutcome::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn experiment(&self) -> Option<&SubmittedExperiment> {
        match self {
            SubmissionOutcome::Accepted { experiment, .. } => Some(experiment),
            SubmissionOutcome::Failed { .. } => None,
        }
    }

    /// The submitted experiment, or the draft if the scheduler refused it.
    #[must_use]
    pub fn into_experiment(self) -> Experiment {
        match self {
            SubmissionOutcome::Accepted { experiment, .. } => Experiment::Submitted(experiment),
            SubmissionOutcome::Failed { draft, .. } => Experiment::Draft(draft),
        }
    }
}
