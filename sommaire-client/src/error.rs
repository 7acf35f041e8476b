//! Error types for sommaire-client
//!
//! Two layers:
//! - [`ClientError`]: what an HTTP service client reports (transport, status, decoding)
//! - [`WorkflowError`]: what the user sees when a submission ends in `Failed`
//!
//! Every `WorkflowError` is recoverable; the user may re-trigger the action
//! immediately.

use thiserror::Error;

/// Shown when the summary endpoint rejects a request without a `detail` message
pub const GENERIC_SERVER_ERROR: &str = "Server error.";

/// Shown for transport failures and undecodable responses
pub const CONNECTIVITY_ERROR: &str = "Could not connect to backend or server error.";

/// Local input problems, detected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Zero images, or more than the allowed maximum
    #[error("Please select between 1 and {max} images.")]
    ImageCount { max: usize },

    #[error("Please enter the employee name.")]
    MissingName,

    #[error("Please select a profile picture.")]
    MissingProfilePicture,

    #[error("Please select a date.")]
    MissingDate,
}

/// HTTP service client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never completed (DNS, connect, timeout, reset)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server answered with a failure status, or a success status without the expected payload
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    ApiError { status: u16, detail: Option<String> },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Terminal failure of a submission attempt
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad local input; no network call was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Profile picture transfer failed; the bundle was not sent
    #[error("Profile picture upload failed")]
    Upload { detail: String },

    /// Summary endpoint returned a handled failure
    #[error("{0}")]
    Submission(String),

    /// Network unreachable or malformed response
    #[error("{0}")]
    Transport(String),

    /// Submit requested while a submission is already outstanding
    ///
    /// Guard rejection only: the workflow state is left untouched.
    #[error("A submission is already in progress.")]
    InFlight,
}

impl WorkflowError {
    /// Map a summary-endpoint client error onto the user-facing taxonomy
    pub fn from_submission(err: ClientError) -> Self {
        match err {
            ClientError::ApiError {
                detail: Some(detail),
                ..
            } => WorkflowError::Submission(detail),
            ClientError::ApiError { detail: None, .. } => {
                WorkflowError::Submission(GENERIC_SERVER_ERROR.to_string())
            }
            ClientError::NetworkError(_) | ClientError::ParseError(_) => {
                WorkflowError::Transport(CONNECTIVITY_ERROR.to_string())
            }
        }
    }

    /// Map an object-storage client error; every storage failure aborts the submission
    pub fn from_upload(err: ClientError) -> Self {
        WorkflowError::Upload {
            detail: err.to_string(),
        }
    }
}
