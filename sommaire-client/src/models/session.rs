//! Historical sessions and per-employee grouping

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One historical submission record, owned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub employee_name: String,
    #[serde(default)]
    pub employee_pfp: Option<String>,
    /// `null` decodes as empty, which never parses as a date
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    /// Accepts a number, a numeric string, or null
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: Option<u8>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl Session {
    /// Calendar date of the session; `None` when the stored value is not a date
    ///
    /// Timestamps (`2024-01-02T10:00:00Z`) are reduced to their date part.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let prefix = self.date.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

/// Inclusive, optionally open-ended date range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Sessions whose date cannot be parsed are never excluded
    pub fn contains(&self, session: &Session) -> bool {
        let Some(date) = session.parsed_date() else {
            return true;
        };
        if matches!(self.from, Some(from) if date < from) {
            return false;
        }
        if matches!(self.to, Some(to) if date > to) {
            return false;
        }
        true
    }
}

/// All sessions sharing an employee name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeProfile {
    pub name: String,
    /// Picture of the first session seen for this name
    pub pfp: Option<String>,
    pub sessions: Vec<Session>,
}

impl EmployeeProfile {
    /// Picture URL fit for display; `None` means show the default avatar
    pub fn avatar_url(&self) -> Option<&str> {
        self.pfp
            .as_deref()
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Newest first; sessions without a parseable date go last, in arrival order
    pub fn sort_sessions_newest_first(&mut self) {
        sort_newest_first(&mut self.sessions);
    }

    /// View over the sessions inside `range`; the profile is not modified
    pub fn sessions_in_range(&self, range: &DateRange) -> Vec<&Session> {
        self.sessions.iter().filter(|s| range.contains(s)).collect()
    }
}

/// Stable sort by date descending
pub fn sort_newest_first(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Group sessions by employee name, in order of first appearance
pub fn group_sessions(sessions: Vec<Session>) -> Vec<EmployeeProfile> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut profiles: Vec<EmployeeProfile> = Vec::new();

    for session in sessions {
        match index.get(&session.employee_name) {
            Some(&i) => profiles[i].sessions.push(session),
            None => {
                index.insert(session.employee_name.clone(), profiles.len());
                profiles.push(EmployeeProfile {
                    name: session.employee_name.clone(),
                    pfp: session.employee_pfp.clone(),
                    sessions: vec![session],
                });
            }
        }
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str, date: &str) -> Session {
        Session {
            employee_name: name.to_string(),
            employee_pfp: Some(format!("https://cdn.example.com/{}-{}.png", name, date)),
            date: date.to_string(),
            summary: format!("summary for {} on {}", name, date),
            score: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_grouping_example() {
        let profiles = group_sessions(vec![
            session("A", "2024-01-02"),
            session("B", "2024-01-01"),
            session("A", "2024-01-03"),
        ]);

        assert_eq!(profiles.len(), 2);
        let a = profiles.iter().find(|p| p.name == "A").unwrap();
        let b = profiles.iter().find(|p| p.name == "B").unwrap();
        assert_eq!(a.session_count(), 2);
        assert_eq!(b.session_count(), 1);
    }

    #[test]
    fn test_profile_picture_from_first_arrival_not_latest_date() {
        let profiles = group_sessions(vec![
            session("A", "2024-01-02"),
            session("A", "2024-01-05"),
        ]);
        assert_eq!(
            profiles[0].pfp.as_deref(),
            Some("https://cdn.example.com/A-2024-01-02.png")
        );
    }

    #[test]
    fn test_grouping_preserves_first_occurrence_order() {
        let profiles = group_sessions(vec![
            session("C", "2024-01-01"),
            session("A", "2024-01-01"),
            session("C", "2024-01-02"),
            session("B", "2024-01-01"),
        ]);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut profile = group_sessions(vec![
            session("A", "2024-01-02"),
            session("A", "not a date"),
            session("A", "2024-01-03"),
            session("A", "2023-12-31"),
        ])
        .remove(0);

        profile.sort_sessions_newest_first();
        let dates: Vec<&str> = profile.sessions.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2023-12-31", "not a date"]);
    }

    #[test]
    fn test_date_range_example() {
        let mut profile =
            group_sessions(vec![session("A", "2024-01-02"), session("A", "2024-01-03")]).remove(0);
        profile.sort_sessions_newest_first();

        let from = DateRange::new(Some(day("2024-01-03")), None);
        let visible = profile.sessions_in_range(&from);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].date, "2024-01-03");

        let to = DateRange::new(None, Some(day("2024-01-01")));
        assert!(profile.sessions_in_range(&to).is_empty());

        // Filtering never mutates the underlying list
        assert_eq!(profile.session_count(), 2);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let s = session("A", "2024-01-02");
        let exact = DateRange::new(Some(day("2024-01-02")), Some(day("2024-01-02")));
        assert!(exact.contains(&s));
        assert!(DateRange::unbounded().contains(&s));
    }

    #[test]
    fn test_timestamp_dates_compare_by_day() {
        let s = session("A", "2024-01-03T18:30:00Z");
        assert_eq!(s.parsed_date(), Some(day("2024-01-03")));
        assert!(DateRange::new(None, Some(day("2024-01-03"))).contains(&s));
    }

    #[test]
    fn test_avatar_requires_http_url() {
        let mut profile = group_sessions(vec![session("A", "2024-01-02")]).remove(0);
        assert!(profile.avatar_url().is_some());

        profile.pfp = Some("undefined".to_string());
        assert_eq!(profile.avatar_url(), None);

        profile.pfp = None;
        assert_eq!(profile.avatar_url(), None);
    }

    #[test]
    fn test_score_accepts_string_number_and_null() {
        let rows = r#"[
            {"employee_name":"A","employee_pfp":null,"date":"2024-01-02","summary":"s","score":"7"},
            {"employee_name":"A","employee_pfp":"https://x/a.png","date":"2024-01-03","summary":"s","score":8},
            {"employee_name":"A","date":"2024-01-04","summary":"s","score":null},
            {"employee_name":"A","date":"2024-01-05","summary":"s"}
        ]"#;
        let sessions: Vec<Session> = serde_json::from_str(rows).unwrap();
        let scores: Vec<Option<u8>> = sessions.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![Some(7), Some(8), None, None]);
        assert_eq!(sessions[0].employee_pfp, None);
    }
}
