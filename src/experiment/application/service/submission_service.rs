use crate::{
    Draft, SchedulerResult, SubmissionOutcome,
    core::infrastructure::transport::Transport,
    experiment::application::{
        request::submission_request::SubmissionRequest, response::submission_response,
    },
};
use tracing::{info, warn};

/// Experiment creation endpoint.
pub const EXPERIMENTS_ENDPOINT: &str = "/v1/experiments";

/// Sends a draft to the scheduler.
pub struct SubmissionService;

impl SubmissionService {
    pub fn new() -> Self {
        Self
    }

    /// Serializes and posts `draft`.
    ///
    /// The draft is consumed. [`SubmissionOutcome::Accepted`] carries the
    /// experiment in `requested` state; [`SubmissionOutcome::Failed`] hands
    /// the draft back unchanged.
    ///
    /// # Errors
    /// Returns `SchedulerError::Conflict` before any request when the draft
    /// cannot be serialized, and transport errors as-is. A refusal by the
    /// scheduler is [`SubmissionOutcome::Failed`], not an error.
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        draft: Draft,
    ) -> SchedulerResult<SubmissionOutcome> {
        let body = SubmissionRequest::from_draft(&draft)?.to_json()?;
        let response = transport.post(EXPERIMENTS_ENDPOINT, body).await?;

        match submission_response::interpret(&response) {
            Ok(report) => {
                info!(experiment = report.experiment, name = draft.name(), "experiment submitted");
                Ok(SubmissionOutcome::Accepted {
                    experiment: draft.into_submitted(&report),
                    report,
                })
            }
            Err(message) => {
                warn!(name = draft.name(), %message, "experiment not accepted");
                Ok(SubmissionOutcome::Failed { draft, message })
            }
        }
    }
}

impl Default for SubmissionService {
    fn default() -> Self {
        Self::new()
    }
}
