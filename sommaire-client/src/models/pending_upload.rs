//! Staged, not-yet-submitted image selection

use crate::error::ValidationError;
use crate::models::{ImageFile, PreviewHandle, PreviewRegistry};

/// Upper bound on images per submission
pub const MAX_IMAGES: usize = 18;

/// Check an image count against `1..=MAX_IMAGES`
pub fn validate_image_count(count: usize) -> Result<(), ValidationError> {
    if count == 0 || count > MAX_IMAGES {
        Err(ValidationError::ImageCount { max: MAX_IMAGES })
    } else {
        Ok(())
    }
}

/// Ordered images plus one preview handle per image, same order
///
/// Either empty, or holding between 1 and [`MAX_IMAGES`] files.
#[derive(Debug, Default)]
pub struct PendingUpload {
    files: Vec<ImageFile>,
    previews: Vec<PreviewHandle>,
}

impl PendingUpload {
    /// Stage a selection, registering previews in `registry`
    pub fn from_selection(
        files: Vec<ImageFile>,
        registry: &PreviewRegistry,
    ) -> Result<Self, ValidationError> {
        validate_image_count(files.len())?;
        let previews = files.iter().map(|f| registry.create(f)).collect();
        Ok(Self { files, previews })
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    pub fn previews(&self) -> &[PreviewHandle] {
        &self.previews
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// True when the staged count may be submitted
    pub fn is_submittable(&self) -> bool {
        validate_image_count(self.files.len()).is_ok()
    }
}
