//! Plain-text rendering for the CLI

use crate::models::{EmployeeProfile, Session, SummaryResult};
use std::fmt::Write;

pub const NO_SESSIONS_IN_RANGE: &str = "No summaries in this date range.";
pub const NO_PROFILES: &str = "No sessions recorded yet.";

fn score_label(score: Option<u8>) -> String {
    match score {
        Some(score) => format!("{}/10", score),
        None => "-".to_string(),
    }
}

/// Result panel: score line (when extracted), then the summary text
pub fn summary_result(result: &SummaryResult) -> String {
    let mut out = String::new();
    if let Some(score) = result.score {
        let _ = writeln!(out, "Score: {}/10", score);
        out.push('\n');
    }
    out.push_str(result.summary_text.trim_end());
    out.push('\n');
    if !result.image_urls.is_empty() {
        out.push_str("\nImages:\n");
        for url in &result.image_urls {
            let _ = writeln!(out, "  {}", url);
        }
    }
    out
}

/// One line per profile: name, session count, avatar
pub fn profile_list(profiles: &[EmployeeProfile]) -> String {
    if profiles.is_empty() {
        return format!("{}\n", NO_PROFILES);
    }
    let width = profiles.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for profile in profiles {
        let _ = writeln!(
            out,
            "{:<width$}  {:>3} session{}  {}",
            profile.name,
            profile.session_count(),
            if profile.session_count() == 1 { "" } else { "s" },
            profile.avatar_url().unwrap_or("(default avatar)"),
            width = width
        );
    }
    out
}

/// Drill-down listing: date, score, then the summary indented
pub fn session_list(profile: &EmployeeProfile, sessions: &[&Session]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", profile.name);
    if sessions.is_empty() {
        let _ = writeln!(out, "  {}", NO_SESSIONS_IN_RANGE);
        return out;
    }
    for session in sessions {
        let _ = writeln!(out, "\n  {}  score {}", session.date, score_label(session.score));
        for line in session.summary.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, sessions: Vec<Session>) -> EmployeeProfile {
        EmployeeProfile {
            name: name.to_string(),
            pfp: Some("https://cdn/a.png".to_string()),
            sessions,
        }
    }

    fn session(date: &str, score: Option<u8>) -> Session {
        Session {
            employee_name: "Alice".to_string(),
            employee_pfp: None,
            date: date.to_string(),
            summary: "line one\nline two".to_string(),
            score,
        }
    }

    #[test]
    fn test_summary_with_score() {
        let result = SummaryResult::from_summary("Focused work. SCORE: 8/10");
        let text = summary_result(&result);
        assert!(text.starts_with("Score: 8/10\n"));
        assert!(text.contains("Focused work."));
    }

    #[test]
    fn test_summary_without_score() {
        let text = summary_result(&SummaryResult::from_summary("No verdict"));
        assert_eq!(text, "No verdict\n");
    }

    #[test]
    fn test_profile_list() {
        let profiles = vec![
            profile("Alice", vec![session("2024-01-01", None), session("2024-01-02", None)]),
            EmployeeProfile {
                name: "Bo".to_string(),
                pfp: None,
                sessions: vec![session("2024-01-01", None)],
            },
        ];
        let text = profile_list(&profiles);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("2 sessions"));
        assert!(lines[1].contains("1 session "));
        assert!(lines[1].ends_with("(default avatar)"));
        assert_eq!(profile_list(&[]), format!("{}\n", NO_PROFILES));
    }

    #[test]
    fn test_session_list_empty_range() {
        let p = profile("Alice", vec![session("2024-01-01", Some(5))]);
        let text = session_list(&p, &[]);
        assert!(text.contains(NO_SESSIONS_IN_RANGE));
    }

    #[test]
    fn test_session_list_entries() {
        let p = profile("Alice", vec![session("2024-01-02", Some(9)), session("2024-01-01", None)]);
        let visible: Vec<&Session> = p.sessions.iter().collect();
        let text = session_list(&p, &visible);
        assert!(text.contains("2024-01-02  score 9/10"));
        assert!(text.contains("2024-01-01  score -"));
        assert!(text.contains("    line two"));
    }
}
