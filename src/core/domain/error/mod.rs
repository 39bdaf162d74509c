use crate::core::domain::model::experiment::ExperimentStatus;
use serde_json::Value;
use thiserror::Error;

/// The main error type for scheduler operations.
///
/// Local usage errors (`NotDraft`, `Conflict`, `PastExperiment`, `Validation`)
/// are raised before any request leaves the process. Remote failures always
/// carry the server's own message text when the server sent one.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Represents errors that occur while talking to the scheduler
    /// (unreachable host, TLS failure, malformed response body)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong
    #[error("Connection error: {0}")]
    Connection(String),

    /// The scheduler answered with a non-2xx status
    ///
    /// # Fields
    /// * `status` - The HTTP status code
    /// * `message` - The server's `message` field, or the raw body
    /// * `body` - The decoded body, when the server sent JSON
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Represents failures of the identity call
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A mutation was attempted on an experiment that is no longer a draft
    #[error("Attempted to modify a non-draft experiment (status: {status})")]
    NotDraft { status: ExperimentStatus },

    /// Two mutually exclusive options are set on the same draft
    #[error("Conflicting options: {0}")]
    Conflict(String),

    /// Availability was requested for an experiment that was already submitted
    #[error("Can't check availability in the past (status: {status})")]
    PastExperiment { status: ExperimentStatus },

    /// The scheduler refused or failed to delete an experiment
    #[error("Deletion failed: {0}")]
    DeletionFailed(String),

    /// Writing downloaded results to disk failed
    #[error("Download error: {0}")]
    Download(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },
}

impl From<ValidationError> for SchedulerError {
    fn from(error: ValidationError) -> Self {
        SchedulerError::Validation { source: error }
    }
}

impl SchedulerError {
    /// Returns `true` for failures that happened on the wire rather than locally.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SchedulerError::Connection(_) | SchedulerError::Api { .. }
        )
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),

    /// A value of the wrong shape was supplied
    ///
    /// # Fields
    /// * `field` - The name of the field
    /// * `expected` - What the field accepts
    #[error("Field '{field}' has the wrong type: expected {expected}")]
    Type { field: String, expected: String },
}

/// Type alias for Results that may fail with a SchedulerError
pub type SchedulerResult<T> = Result<T, SchedulerError>;
