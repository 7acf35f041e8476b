//! History browser view-state
//!
//! Fetches every past session, groups them per employee, and drives the
//! list → drill-down → date filter navigation. Loads are ticketed like
//! submissions: a listing that arrives for a superseded load is dropped.

use crate::error::{ClientError, CONNECTIVITY_ERROR, GENERIC_SERVER_ERROR};
use crate::models::{group_sessions, DateRange, EmployeeProfile, Session};
use crate::services::SummaryService;
use chrono::{NaiveDate, Utc};
use sommaire_common::events::{ClientEvent, EventBus};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identity of one session-listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(Uuid);

impl LoadTicket {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Grouped session history with drill-down and date filtering
#[derive(Debug, Default)]
pub struct HistoryBrowser {
    profiles: Vec<EmployeeProfile>,
    selected: Option<usize>,
    range: DateRange,
    pending_load: Option<LoadTicket>,
    load_error: Option<String>,
    events: Option<EventBus>,
}

impl HistoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Start a listing; any earlier outstanding load is superseded
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = LoadTicket::new();
        self.pending_load = Some(ticket);
        debug!("Session listing requested");
        ticket
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Apply a listing result
    ///
    /// Returns false and changes nothing for a superseded ticket. A failed
    /// listing leaves the profile list empty and records the error.
    pub fn apply_sessions(
        &mut self,
        ticket: LoadTicket,
        listing: Result<Vec<Session>, ClientError>,
    ) -> bool {
        if self.pending_load != Some(ticket) {
            debug!("Discarding stale session listing");
            return false;
        }
        self.pending_load = None;
        self.selected = None;
        self.range = DateRange::unbounded();

        match listing {
            Ok(sessions) => {
                let session_count = sessions.len();
                self.profiles = group_sessions(sessions);
                self.load_error = None;
                info!(
                    profiles = self.profiles.len(),
                    sessions = session_count,
                    "History loaded"
                );
                self.emit(ClientEvent::HistoryLoaded {
                    profile_count: self.profiles.len(),
                    session_count,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                warn!("Failed to load sessions: {}", e);
                let message = match e {
                    ClientError::ApiError { .. } => GENERIC_SERVER_ERROR,
                    _ => CONNECTIVITY_ERROR,
                }
                .to_string();
                self.profiles.clear();
                self.emit(ClientEvent::HistoryLoadFailed {
                    message: message.clone(),
                    timestamp: Utc::now(),
                });
                self.load_error = Some(message);
            }
        }
        true
    }

    /// Fetch and apply in one step
    pub async fn load(&mut self, api: &dyn SummaryService) -> bool {
        let ticket = self.begin_load();
        let listing = api.list_sessions().await;
        self.apply_sessions(ticket, listing)
    }

    fn emit(&self, event: ClientEvent) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(event);
        }
    }

    /// Profiles in first-appearance order
    pub fn profiles(&self) -> &[EmployeeProfile] {
        &self.profiles
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Enter drill-down for `name`
    ///
    /// Sorts that profile's sessions newest first and resets the date filter.
    /// Returns false when no profile has that name.
    pub fn select_profile(&mut self, name: &str) -> bool {
        let Some(index) = self.profiles.iter().position(|p| p.name == name) else {
            return false;
        };
        self.profiles[index].sort_sessions_newest_first();
        self.selected = Some(index);
        self.range = DateRange::unbounded();
        true
    }

    /// Leave drill-down
    pub fn back(&mut self) {
        self.selected = None;
    }

    pub fn selected_profile(&self) -> Option<&EmployeeProfile> {
        self.selected.and_then(|i| self.profiles.get(i))
    }

    pub fn filter_by_date_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.range = DateRange::new(from, to);
    }

    pub fn date_range(&self) -> DateRange {
        self.range
    }

    /// Sessions of the selected profile within the current range, newest first
    pub fn visible_sessions(&self) -> Vec<&Session> {
        self.selected_profile()
            .map(|p| p.sessions_in_range(&self.range))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str, date: &str) -> Session {
        Session {
            employee_name: name.to_string(),
            employee_pfp: Some(format!("https://cdn/{}.png", name)),
            date: date.to_string(),
            summary: format!("{} on {}", name, date),
            score: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn loaded(sessions: Vec<Session>) -> HistoryBrowser {
        let mut browser = HistoryBrowser::new();
        let ticket = browser.begin_load();
        assert!(browser.apply_sessions(ticket, Ok(sessions)));
        browser
    }

    #[test]
    fn test_grouping_by_employee() {
        let browser = loaded(vec![
            session("A", "2024-01-02"),
            session("A", "2024-01-01"),
            session("B", "2024-01-03"),
        ]);

        let profiles = browser.profiles();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "A");
        assert_eq!(profiles[0].session_count(), 2);
        assert_eq!(profiles[1].name, "B");
        assert_eq!(profiles[1].session_count(), 1);
        assert!(!browser.is_loading());
    }

    #[test]
    fn test_select_sorts_newest_first() {
        let mut browser = loaded(vec![
            session("A", "2024-01-01"),
            session("A", "2024-01-05"),
            session("A", "2024-01-03"),
        ]);

        assert!(browser.select_profile("A"));
        let dates: Vec<_> = browser.visible_sessions().iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-03", "2024-01-01"]);

        assert!(!browser.select_profile("Nobody"));
        assert_eq!(browser.selected_profile().map(|p| p.name.as_str()), Some("A"));
    }

    #[test]
    fn test_date_range_filter() {
        let mut browser = loaded(vec![session("A", "2024-01-02"), session("A", "2024-01-03")]);
        browser.select_profile("A");

        browser.filter_by_date_range(Some(date("2024-01-03")), None);
        let visible = browser.visible_sessions();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].date, "2024-01-03");

        browser.filter_by_date_range(None, Some(date("2024-01-01")));
        assert!(browser.visible_sessions().is_empty());

        // Inclusive on both ends
        browser.filter_by_date_range(Some(date("2024-01-02")), Some(date("2024-01-02")));
        assert_eq!(browser.visible_sessions().len(), 1);

        // Filtering never drops sessions from the profile itself
        assert_eq!(browser.selected_profile().unwrap().session_count(), 2);
    }

    #[test]
    fn test_reselect_resets_filter() {
        let mut browser = loaded(vec![session("A", "2024-01-02"), session("B", "2024-01-03")]);
        browser.select_profile("A");
        browser.filter_by_date_range(Some(date("2024-02-01")), None);
        assert!(browser.visible_sessions().is_empty());

        browser.back();
        assert!(browser.selected_profile().is_none());
        assert!(browser.visible_sessions().is_empty());

        browser.select_profile("A");
        assert_eq!(browser.date_range(), DateRange::unbounded());
        assert_eq!(browser.visible_sessions().len(), 1);
    }

    #[test]
    fn test_failed_load_is_empty_with_error() {
        let mut browser = loaded(vec![session("A", "2024-01-02")]);
        let ticket = browser.begin_load();
        browser.apply_sessions(ticket, Err(ClientError::NetworkError("refused".to_string())));

        assert!(browser.profiles().is_empty());
        assert_eq!(browser.load_error(), Some(CONNECTIVITY_ERROR));

        let ticket = browser.begin_load();
        browser.apply_sessions(ticket, Ok(vec![]));
        assert!(browser.load_error().is_none());
    }

    #[test]
    fn test_superseded_load_is_discarded() {
        let mut browser = HistoryBrowser::new();
        let first = browser.begin_load();
        let second = browser.begin_load();

        assert!(!browser.apply_sessions(first, Ok(vec![session("Old", "2024-01-01")])));
        assert!(browser.profiles().is_empty());
        assert!(browser.is_loading());

        assert!(browser.apply_sessions(second, Ok(vec![session("New", "2024-01-01")])));
        assert_eq!(browser.profiles()[0].name, "New");
    }

    #[test]
    fn test_load_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let mut browser = HistoryBrowser::new().with_event_bus(bus);

        let ticket = browser.begin_load();
        browser.apply_sessions(ticket, Ok(vec![session("A", "2024-01-01"), session("B", "2024-01-01")]));

        match rx.try_recv().unwrap() {
            ClientEvent::HistoryLoaded {
                profile_count,
                session_count,
                ..
            } => {
                assert_eq!(profile_count, 2);
                assert_eq!(session_count, 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
