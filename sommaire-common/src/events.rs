//! Event types for the Sommaire client
//!
//! View-state models emit [`ClientEvent`]s on an [`EventBus`] so a front end
//! (the CLI, or any other renderer) can follow workflow progress without
//! polling the models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Coarse phase of the submission workflow
///
/// Idle → Validating → UploadingPfp (optional) → Submitting → Succeeded | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Validating,
    UploadingPfp,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    /// True while a network-bound step is outstanding
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            SubmissionPhase::Validating | SubmissionPhase::UploadingPfp | SubmissionPhase::Submitting
        )
    }
}

/// Client event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Submission workflow moved between phases
    SubmissionPhaseChanged {
        old_phase: SubmissionPhase,
        new_phase: SubmissionPhase,
        timestamp: DateTime<Utc>,
    },

    /// Summary received and stored
    SubmissionSucceeded {
        /// Score parsed from the summary text, if present
        score: Option<u8>,
        timestamp: DateTime<Utc>,
    },

    /// Submission ended in the Failed state
    SubmissionFailed {
        /// User-visible message
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Session history fetched and grouped
    HistoryLoaded {
        profile_count: usize,
        session_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Session history could not be fetched
    HistoryLoadFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast channel for [`ClientEvent`]s
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ClientEvent,
    ) -> Result<usize, broadcast::error::SendError<ClientEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
