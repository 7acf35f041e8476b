//! sommaire-client library interface
//!
//! View-state models and HTTP clients for the productivity-summary service:
//! - [`workflow`]: image intake and the submission state machine
//! - [`history`]: grouped session history with date filtering
//! - [`app`]: the upload / history mode switch
//! - [`services`]: object-storage and summary API clients

pub mod app;
pub mod error;
pub mod history;
pub mod models;
pub mod render;
pub mod services;
pub mod workflow;

pub use crate::app::{App, Mode};
pub use crate::error::{ClientError, ValidationError, WorkflowError};
pub use crate::history::{HistoryBrowser, LoadTicket};
pub use crate::workflow::{SubmissionState, UploadScreen};
