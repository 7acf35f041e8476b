//! Submission job: the network half of one submit attempt
//!
//! A job owns a snapshot of everything it sends, so the screen stays free to
//! handle events while the job runs. Its result comes back as a
//! [`SubmissionOutcome`] tagged with the job's ticket.

use crate::error::WorkflowError;
use crate::models::{ImageFile, SummaryResult};
use crate::services::{ProfilePictureStore, SubmissionBundle, SummaryService};
use crate::workflow::SubmissionTicket;

/// Snapshot taken when a submit request passes validation
#[derive(Debug, Clone)]
pub struct SubmissionJob {
    pub(crate) ticket: SubmissionTicket,
    pub(crate) images: Vec<ImageFile>,
    pub(crate) employee_name: String,
    pub(crate) date: String,
    pub(crate) profile_picture: ImageFile,
    pub(crate) picture_revision: u64,
    pub(crate) cached_pfp_url: Option<String>,
}

/// Completion of a job, applied back onto the screen that issued it
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub ticket: SubmissionTicket,
    /// Picture revision the upload (if any) belongs to
    pub picture_revision: u64,
    /// Set when this job uploaded the profile picture, even if the summary call then failed
    pub uploaded_pfp_url: Option<String>,
    pub result: Result<SummaryResult, WorkflowError>,
}

impl SubmissionJob {
    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// False when a remote URL for the current picture is already cached
    pub fn needs_profile_upload(&self) -> bool {
        self.cached_pfp_url.is_none()
    }

    pub async fn upload_profile_picture(
        &self,
        store: &dyn ProfilePictureStore,
    ) -> Result<String, WorkflowError> {
        store
            .upload_profile_picture(&self.profile_picture)
            .await
            .map_err(WorkflowError::from_upload)
    }

    /// Send the bundle with the resolved picture URL
    pub async fn send(
        &self,
        api: &dyn SummaryService,
        pfp_url: String,
    ) -> Result<SummaryResult, WorkflowError> {
        let bundle = SubmissionBundle {
            images: self.images.clone(),
            employee_name: self.employee_name.clone(),
            employee_pfp: pfp_url,
            date: self.date.clone(),
        };

        let response = api
            .submit_bundle(&bundle)
            .await
            .map_err(WorkflowError::from_submission)?;

        Ok(SummaryResult::from_summary(response.summary).with_image_urls(response.image_urls))
    }

    /// Build the outcome for this job
    pub fn outcome(
        &self,
        uploaded_pfp_url: Option<String>,
        result: Result<SummaryResult, WorkflowError>,
    ) -> SubmissionOutcome {
        SubmissionOutcome {
            ticket: self.ticket,
            picture_revision: self.picture_revision,
            uploaded_pfp_url,
            result,
        }
    }

    /// Picture URL to send: the cached one, or a fresh upload
    ///
    /// The second element is set only when this call uploaded.
    pub async fn resolve_pfp_url(
        &self,
        store: &dyn ProfilePictureStore,
    ) -> Result<(String, Option<String>), WorkflowError> {
        if let Some(url) = &self.cached_pfp_url {
            return Ok((url.clone(), None));
        }
        let url = self.upload_profile_picture(store).await?;
        Ok((url.clone(), Some(url)))
    }

    /// Run every remaining step: picture upload (if needed), then the bundle
    ///
    /// A failed upload ends the job; the bundle is never sent.
    pub async fn run(
        self,
        store: &dyn ProfilePictureStore,
        api: &dyn SummaryService,
    ) -> SubmissionOutcome {
        let (pfp_url, uploaded) = match self.resolve_pfp_url(store).await {
            Ok(resolved) => resolved,
            Err(e) => return self.outcome(None, Err(e)),
        };

        let result = self.send(api, pfp_url).await;
        self.outcome(uploaded, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProfilePictureStore for CountingStore {
        async fn upload_profile_picture(&self, picture: &ImageFile) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://cdn/{}", picture.file_name))
        }
    }

    fn job(cached_pfp_url: Option<&str>) -> SubmissionJob {
        SubmissionJob {
            ticket: SubmissionTicket::new(),
            images: vec![ImageFile::new("shot.png", "image/png", vec![1])],
            employee_name: "Alice".to_string(),
            date: "2024-01-02".to_string(),
            profile_picture: ImageFile::new("alice.png", "image/png", vec![2]),
            picture_revision: 1,
            cached_pfp_url: cached_pfp_url.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_cached_url_skips_upload() {
        let store = CountingStore::default();
        let (url, uploaded) = job(Some("https://cdn/cached.png"))
            .resolve_pfp_url(&store)
            .await
            .unwrap();

        assert_eq!(url, "https://cdn/cached.png");
        assert!(uploaded.is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_url_uploads_once() {
        let store = CountingStore::default();
        let (url, uploaded) = job(None).resolve_pfp_url(&store).await.unwrap();

        assert_eq!(url, "https://cdn/alice.png");
        assert_eq!(uploaded.as_deref(), Some("https://cdn/alice.png"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
