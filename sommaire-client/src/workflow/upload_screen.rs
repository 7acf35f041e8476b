//! Upload screen view-state
//!
//! Owns the staged images, the employee metadata, the drag indicator, and the
//! submission state machine. Event handlers take `&mut self`; network work is
//! handed out as a [`SubmissionJob`] and its [`SubmissionOutcome`] is applied
//! back only if it is still the active attempt.

use crate::error::{ValidationError, WorkflowError};
use crate::models::{
    validate_image_count, EmployeeMetadata, ImageFile, PendingUpload, PreviewRegistry,
    SummaryResult,
};
use crate::services::{ProfilePictureStore, SummaryService};
use crate::workflow::{SubmissionJob, SubmissionOutcome, SubmissionState, SubmissionTicket};
use chrono::Utc;
use sommaire_common::events::{ClientEvent, EventBus};
use tracing::{debug, info, warn};

/// Client-side state of the upload view
#[derive(Debug, Default)]
pub struct UploadScreen {
    pending: PendingUpload,
    selection_error: Option<ValidationError>,
    drag_active: bool,
    metadata: EmployeeMetadata,
    state: SubmissionState,
    active_ticket: Option<SubmissionTicket>,
    previews: PreviewRegistry,
    events: Option<EventBus>,
}

impl UploadScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit transitions on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    // ------------------------------------------------------------------
    // Intake
    // ------------------------------------------------------------------

    /// Replace the staged selection
    ///
    /// Out-of-bounds selections clear whatever was staged and set the
    /// selection error; valid ones replace it wholesale and clear the error.
    /// Previews of the replaced selection are released either way.
    pub fn select_files(&mut self, files: Vec<ImageFile>) -> Result<usize, ValidationError> {
        match PendingUpload::from_selection(files, &self.previews) {
            Ok(pending) => {
                let count = pending.len();
                self.pending = pending;
                self.selection_error = None;
                debug!(count, "Images staged");
                Ok(count)
            }
            Err(e) => {
                self.pending = PendingUpload::default();
                self.selection_error = Some(e.clone());
                debug!("Image selection rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Files chosen through the picker; an empty pick is ignored
    pub fn pick_files(&mut self, files: Vec<ImageFile>) -> Option<Result<usize, ValidationError>> {
        if files.is_empty() {
            return None;
        }
        Some(self.select_files(files))
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_over(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Files dropped on the drop area; an empty drop only resets the indicator
    pub fn drop_files(&mut self, files: Vec<ImageFile>) -> Option<Result<usize, ValidationError>> {
        self.drag_active = false;
        self.pick_files(files)
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn pending(&self) -> &PendingUpload {
        &self.pending
    }

    /// Registry holding this screen's previews
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn selection_error(&self) -> Option<&ValidationError> {
        self.selection_error.as_ref()
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    pub fn metadata(&self) -> &EmployeeMetadata {
        &self.metadata
    }

    pub fn set_employee_name(&mut self, name: impl Into<String>) {
        self.metadata.set_name(name);
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.metadata.set_date(date);
    }

    pub fn set_profile_picture(&mut self, picture: Option<ImageFile>) {
        self.metadata.set_profile_picture(picture);
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn result(&self) -> Option<&SummaryResult> {
        self.state.result()
    }

    /// Error line to display: a selection problem first, else a failed submission
    pub fn error_message(&self) -> Option<String> {
        self.selection_error
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| self.state.error().map(ToString::to_string))
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        self.pending.is_submittable()
            && self.metadata.has_name()
            && self.metadata.profile_picture().is_some()
            && self.metadata.has_date()
            && !self.state.is_in_flight()
    }

    fn transition(&mut self, new_state: SubmissionState) {
        let old_phase = self.state.phase();
        let new_phase = new_state.phase();
        self.state = new_state;

        if old_phase != new_phase {
            debug!(?old_phase, ?new_phase, "Submission phase changed");
        }

        let Some(bus) = &self.events else {
            return;
        };
        let timestamp = Utc::now();
        bus.emit_lossy(ClientEvent::SubmissionPhaseChanged {
            old_phase,
            new_phase,
            timestamp,
        });
        match &self.state {
            SubmissionState::Succeeded(result) => bus.emit_lossy(ClientEvent::SubmissionSucceeded {
                score: result.score,
                timestamp,
            }),
            SubmissionState::Failed(err) => bus.emit_lossy(ClientEvent::SubmissionFailed {
                message: err.to_string(),
                timestamp,
            }),
            _ => {}
        }
    }

    fn fail(&mut self, err: WorkflowError) {
        warn!("Submission failed: {}", err);
        self.active_ticket = None;
        self.transition(SubmissionState::Failed(err));
    }

    /// Handle a submit request
    ///
    /// Rejected with [`WorkflowError::InFlight`] (state untouched) while an
    /// attempt is outstanding. Validation failures move to `Failed` without
    /// any network call and are also returned. Otherwise the state moves to
    /// `UploadingPfp` or `Submitting` and the job to run is returned.
    pub fn begin_submit(&mut self) -> Result<SubmissionJob, WorkflowError> {
        if self.state.is_in_flight() {
            warn!("Submit ignored: a submission is already in progress");
            return Err(WorkflowError::InFlight);
        }

        self.transition(SubmissionState::Validating);

        let validation = self
            .metadata
            .validate()
            .and_then(|()| validate_image_count(self.pending.len()));
        if let Err(e) = validation {
            self.fail(WorkflowError::Validation(e.clone()));
            return Err(WorkflowError::Validation(e));
        }

        let Some(profile_picture) = self.metadata.profile_picture().cloned() else {
            // validate() already guarantees a picture
            self.fail(ValidationError::MissingProfilePicture.into());
            return Err(ValidationError::MissingProfilePicture.into());
        };

        let ticket = SubmissionTicket::new();
        let job = SubmissionJob {
            ticket,
            images: self.pending.files().to_vec(),
            employee_name: self.metadata.name().to_string(),
            date: self.metadata.date().to_string(),
            profile_picture,
            picture_revision: self.metadata.picture_revision(),
            cached_pfp_url: self.metadata.profile_picture_url().map(str::to_string),
        };
        self.active_ticket = Some(ticket);

        info!(
            images = job.image_count(),
            employee = %job.employee_name,
            date = %job.date,
            cached_picture = !job.needs_profile_upload(),
            "Submission started"
        );

        if job.needs_profile_upload() {
            self.transition(SubmissionState::UploadingPfp);
        } else {
            self.transition(SubmissionState::Submitting);
        }
        Ok(job)
    }

    /// Record that the job's picture upload finished and the bundle is being sent
    ///
    /// Ignored for stale tickets.
    pub fn mark_submitting(&mut self, ticket: SubmissionTicket) -> bool {
        if self.active_ticket != Some(ticket) {
            return false;
        }
        if matches!(self.state, SubmissionState::UploadingPfp) {
            self.transition(SubmissionState::Submitting);
        }
        true
    }

    /// Apply a job's completion
    ///
    /// Returns false, changing nothing, when the outcome belongs to an
    /// attempt that is no longer active.
    pub fn apply_outcome(&mut self, outcome: SubmissionOutcome) -> bool {
        if self.active_ticket != Some(outcome.ticket) {
            debug!("Discarding stale submission outcome");
            return false;
        }

        if let Some(url) = outcome.uploaded_pfp_url {
            if !self
                .metadata
                .cache_profile_picture_url(outcome.picture_revision, url)
            {
                debug!("Picture changed during upload; remote URL not cached");
            }
        }

        match outcome.result {
            Ok(result) => {
                info!(score = ?result.score, "Submission succeeded");
                self.active_ticket = None;
                self.transition(SubmissionState::Succeeded(result));
            }
            Err(e) => self.fail(e),
        }
        true
    }

    /// Drive one complete submit attempt
    ///
    /// Sequential driver over [`begin_submit`](Self::begin_submit), the job
    /// steps, and [`apply_outcome`](Self::apply_outcome).
    pub async fn submit(
        &mut self,
        store: &dyn ProfilePictureStore,
        api: &dyn SummaryService,
    ) -> &SubmissionState {
        let job = match self.begin_submit() {
            Ok(job) => job,
            Err(_) => return &self.state,
        };

        let (pfp_url, uploaded) = match job.resolve_pfp_url(store).await {
            Ok(resolved) => resolved,
            Err(e) => {
                self.apply_outcome(job.outcome(None, Err(e)));
                return &self.state;
            }
        };

        self.mark_submitting(job.ticket());
        let result = job.send(api, pfp_url).await;
        self.apply_outcome(job.outcome(uploaded, result));
        &self.state
    }

    /// Tear down the screen's state, invalidating any outstanding attempt
    pub fn reset(&mut self) {
        let events = self.events.take();
        *self = Self {
            previews: self.previews.clone(),
            events,
            ..Self::default()
        };
    }
}
