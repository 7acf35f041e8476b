//! Submission workflow state machine
//!
//! # State Progression
//! IDLE → VALIDATING → UPLOADING_PFP (only without a cached picture URL) → SUBMITTING → SUCCEEDED | FAILED
//!
//! SUCCEEDED and FAILED are terminal for one attempt; the next submit leaves
//! them through VALIDATING again. The in-flight states double as the guard
//! that keeps at most one submission outstanding.

use crate::error::WorkflowError;
use crate::models::SummaryResult;
use sommaire_common::events::SubmissionPhase;
use uuid::Uuid;

/// Current state of the upload screen's submission
#[derive(Debug, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// Required fields and image count being checked
    Validating,
    /// Profile picture being sent to object storage
    UploadingPfp,
    /// Bundle sent, waiting for the summary
    Submitting,
    Succeeded(SummaryResult),
    Failed(WorkflowError),
}

impl SubmissionState {
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            SubmissionState::Idle => SubmissionPhase::Idle,
            SubmissionState::Validating => SubmissionPhase::Validating,
            SubmissionState::UploadingPfp => SubmissionPhase::UploadingPfp,
            SubmissionState::Submitting => SubmissionPhase::Submitting,
            SubmissionState::Succeeded(_) => SubmissionPhase::Succeeded,
            SubmissionState::Failed(_) => SubmissionPhase::Failed,
        }
    }

    /// True from submit request until Succeeded/Failed
    pub fn is_in_flight(&self) -> bool {
        self.phase().is_in_flight()
    }

    pub fn result(&self) -> Option<&SummaryResult> {
        match self {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            SubmissionState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Identity of one submission attempt
///
/// Completions carry their ticket; a completion whose ticket is no longer the
/// active one is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(Uuid);

impl SubmissionTicket {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}
