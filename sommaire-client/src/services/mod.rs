//! HTTP service clients for the external collaborators
//!
//! Each collaborator sits behind a trait so the workflow can be driven
//! against fakes in tests.

pub mod storage_client;
pub mod summary_client;

pub use storage_client::{object_key, ProfilePictureStore, StorageClient};
pub use summary_client::{SubmissionBundle, SummaryClient, SummaryResponse, SummaryService};
