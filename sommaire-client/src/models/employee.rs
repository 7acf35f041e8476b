//! Employee metadata entered alongside an image batch

use crate::error::ValidationError;
use crate::models::ImageFile;

/// Name, profile picture, and date for one submission
///
/// The remote profile-picture URL is a cache of the last successful upload of
/// the *current* picture; selecting another picture invalidates it.
#[derive(Debug, Clone, Default)]
pub struct EmployeeMetadata {
    name: String,
    date: String,
    profile_picture: Option<ImageFile>,
    profile_picture_url: Option<String>,
    /// Bumped on every picture change so late uploads of an old picture are not cached
    picture_revision: u64,
}

impl EmployeeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Calendar date as entered (`YYYY-MM-DD`)
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    pub fn profile_picture(&self) -> Option<&ImageFile> {
        self.profile_picture.as_ref()
    }

    /// Replace (or clear) the picture, dropping any cached remote URL
    pub fn set_profile_picture(&mut self, picture: Option<ImageFile>) {
        self.profile_picture = picture;
        self.profile_picture_url = None;
        self.picture_revision += 1;
    }

    pub fn profile_picture_url(&self) -> Option<&str> {
        self.profile_picture_url.as_deref()
    }

    pub fn picture_revision(&self) -> u64 {
        self.picture_revision
    }

    /// Cache the remote URL if it belongs to the current picture
    ///
    /// Returns false (and caches nothing) when the picture changed since
    /// `revision` was taken.
    pub fn cache_profile_picture_url(&mut self, revision: u64, url: String) -> bool {
        if revision != self.picture_revision || self.profile_picture.is_none() {
            return false;
        }
        self.profile_picture_url = Some(url);
        true
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn has_date(&self) -> bool {
        !self.date.trim().is_empty()
    }

    /// Required-field check, in display order: name, picture, date
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_name() {
            return Err(ValidationError::MissingName);
        }
        if self.profile_picture.is_none() {
            return Err(ValidationError::MissingProfilePicture);
        }
        if !self.has_date() {
            return Err(ValidationError::MissingDate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", vec![9])
    }

    fn complete() -> EmployeeMetadata {
        let mut meta = EmployeeMetadata::new();
        meta.set_name("Alice");
        meta.set_date("2024-01-02");
        meta.set_profile_picture(Some(picture("alice.png")));
        meta
    }

    #[test]
    fn test_validation_order() {
        let meta = EmployeeMetadata::new();
        assert_eq!(meta.validate(), Err(ValidationError::MissingName));

        let mut meta = EmployeeMetadata::new();
        meta.set_name("Alice");
        assert_eq!(meta.validate(), Err(ValidationError::MissingProfilePicture));

        meta.set_profile_picture(Some(picture("alice.png")));
        assert_eq!(meta.validate(), Err(ValidationError::MissingDate));

        meta.set_date("2024-01-02");
        assert_eq!(meta.validate(), Ok(()));
    }

    #[test]
    fn test_whitespace_name_is_missing() {
        let mut meta = complete();
        meta.set_name("   ");
        assert_eq!(meta.validate(), Err(ValidationError::MissingName));
    }

    #[test]
    fn test_url_cached_for_current_picture() {
        let mut meta = complete();
        let revision = meta.picture_revision();
        assert!(meta.cache_profile_picture_url(revision, "https://cdn/a.png".to_string()));
        assert_eq!(meta.profile_picture_url(), Some("https://cdn/a.png"));
    }

    #[test]
    fn test_changing_picture_clears_cache_and_rejects_stale_url() {
        let mut meta = complete();
        let old_revision = meta.picture_revision();
        meta.cache_profile_picture_url(old_revision, "https://cdn/a.png".to_string());

        meta.set_profile_picture(Some(picture("alice-new.png")));
        assert_eq!(meta.profile_picture_url(), None);

        // A late result for the old picture must not be cached
        assert!(!meta.cache_profile_picture_url(old_revision, "https://cdn/a.png".to_string()));
        assert_eq!(meta.profile_picture_url(), None);
    }
}
