//! Upload-screen submission workflow
//!
//! `UploadScreen` holds view-state and validates; `SubmissionJob` performs the
//! network steps; `SubmissionState` is the machine both sides agree on.

mod state;
mod submission;
mod upload_screen;

pub use state::{SubmissionState, SubmissionTicket};
pub use submission::{SubmissionJob, SubmissionOutcome};
pub use upload_screen::UploadScreen;
