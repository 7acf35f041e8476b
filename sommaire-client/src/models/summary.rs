//! Productivity summary returned by the analysis service

use once_cell::sync::Lazy;
use regex::Regex;

/// `SCORE: N/10` or `SCORE: NN/10`, anywhere in the text
static SCORE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SCORE: (\d{1,2})/10").expect("score pattern is valid"));

/// Extract the advisory productivity score from free-text summary content
///
/// Only the first match counts. Absence is not an error.
pub fn extract_score(summary: &str) -> Option<u8> {
    SCORE_PATTERN
        .captures(summary)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Successful submission result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// Summary exactly as returned by the service
    pub summary_text: String,
    /// Parsed from `summary_text`; `None` when the pattern is absent
    pub score: Option<u8>,
    /// Stored image URLs, when the service reports them
    pub image_urls: Vec<String>,
}

impl SummaryResult {
    pub fn from_summary(summary_text: impl Into<String>) -> Self {
        let summary_text = summary_text.into();
        let score = extract_score(&summary_text);
        Self {
            summary_text,
            score,
            image_urls: Vec::new(),
        }
    }

    pub fn with_image_urls(mut self, image_urls: Vec<String>) -> Self {
        self.image_urls = image_urls;
        self
    }
}
