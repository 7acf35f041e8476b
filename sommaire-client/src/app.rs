//! Top-level mode switch between the upload screen and the history browser

use crate::error::ClientError;
use crate::history::{HistoryBrowser, LoadTicket};
use crate::models::Session;
use crate::workflow::UploadScreen;
use sommaire_common::events::EventBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Upload,
    History,
}

/// Whole-client view-state
///
/// The upload screen lives for the whole session; the history browser is
/// rebuilt every time history is entered.
#[derive(Debug, Default)]
pub struct App {
    mode: Mode,
    upload: UploadScreen,
    history: HistoryBrowser,
    events: Option<EventBus>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_bus(bus: EventBus) -> Self {
        Self {
            mode: Mode::Upload,
            upload: UploadScreen::new().with_event_bus(bus.clone()),
            history: HistoryBrowser::new().with_event_bus(bus.clone()),
            events: Some(bus),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch to history with a fresh browser and start its listing
    pub fn enter_history(&mut self) -> LoadTicket {
        let mut history = HistoryBrowser::new();
        if let Some(bus) = &self.events {
            history = history.with_event_bus(bus.clone());
        }
        self.history = history;
        self.mode = Mode::History;
        self.history.begin_load()
    }

    /// Back to the upload screen, which keeps its state
    pub fn leave_history(&mut self) {
        self.mode = Mode::Upload;
    }

    /// Route a listing to the current browser; stale tickets are dropped
    pub fn apply_history(
        &mut self,
        ticket: LoadTicket,
        listing: Result<Vec<Session>, ClientError>,
    ) -> bool {
        self.history.apply_sessions(ticket, listing)
    }

    pub fn upload(&self) -> &UploadScreen {
        &self.upload
    }

    pub fn upload_mut(&mut self) -> &mut UploadScreen {
        &mut self.upload
    }

    pub fn history(&self) -> &HistoryBrowser {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryBrowser {
        &mut self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str) -> Session {
        Session {
            employee_name: name.to_string(),
            employee_pfp: None,
            date: "2024-01-01".to_string(),
            summary: String::new(),
            score: None,
        }
    }

    #[test]
    fn test_starts_in_upload_mode() {
        assert_eq!(App::new().mode(), Mode::Upload);
    }

    #[test]
    fn test_upload_state_survives_history_round_trip() {
        let mut app = App::new();
        app.upload_mut().set_employee_name("Alice");

        let ticket = app.enter_history();
        assert_eq!(app.mode(), Mode::History);
        assert!(app.history().is_loading());
        assert!(app.apply_history(ticket, Ok(vec![session("A")])));

        app.leave_history();
        assert_eq!(app.mode(), Mode::Upload);
        assert_eq!(app.upload().metadata().name(), "Alice");
    }

    #[test]
    fn test_reentering_history_drops_old_listing() {
        let mut app = App::new();
        let first = app.enter_history();
        app.leave_history();
        let second = app.enter_history();

        assert!(!app.apply_history(first, Ok(vec![session("Old")])));
        assert!(app.history().profiles().is_empty());
        assert!(app.apply_history(second, Ok(vec![session("New")])));
        assert_eq!(app.history().profiles().len(), 1);
    }

    #[test]
    fn test_fresh_browser_forgets_selection() {
        let mut app = App::new();
        let ticket = app.enter_history();
        app.apply_history(ticket, Ok(vec![session("A")]));
        app.history_mut().select_profile("A");
        assert!(app.history().selected_profile().is_some());

        app.leave_history();
        app.enter_history();
        assert!(app.history().selected_profile().is_none());
    }
}
