//! Data models for the Sommaire client
//!
//! - Intake: [`ImageFile`], [`PendingUpload`], preview handles
//! - Submission: [`EmployeeMetadata`], [`SummaryResult`]
//! - History: [`Session`], [`EmployeeProfile`], [`DateRange`]

pub mod employee;
pub mod image;
pub mod pending_upload;
pub mod preview;
pub mod session;
pub mod summary;

pub use employee::EmployeeMetadata;
pub use image::ImageFile;
pub use pending_upload::{validate_image_count, PendingUpload, MAX_IMAGES};
pub use preview::{PreviewHandle, PreviewRegistry, PreviewSource};
pub use session::{group_sessions, sort_newest_first, DateRange, EmployeeProfile, Session};
pub use summary::{extract_score, SummaryResult};
