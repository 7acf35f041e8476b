//! Summary/session API client
//!
//! - `POST {api}/upload`: multipart bundle of images + employee metadata,
//!   answered with `{ summary }` or `{ detail }`
//! - `GET {api}/sessions`: JSON array of past sessions

use crate::error::ClientError;
use crate::models::{ImageFile, Session};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use sommaire_common::ClientConfig;
use std::time::Duration;

const USER_AGENT: &str = concat!("sommaire/", env!("CARGO_PKG_VERSION"));
/// Summary generation runs a vision model over up to 18 images
const SUBMIT_TIMEOUT_SECS: u64 = 300;

/// Everything sent in one submission
#[derive(Debug, Clone)]
pub struct SubmissionBundle {
    /// Sent as repeated `images` parts, in this order
    pub images: Vec<ImageFile>,
    pub employee_name: String,
    /// Public URL of the uploaded profile picture
    pub employee_pfp: String,
    /// ISO date string
    pub date: String,
}

/// Successful `/upload` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: String,
    pub image_urls: Vec<String>,
}

/// Raw `/upload` body; any subset of fields may be present
#[derive(Debug, Default, Deserialize)]
struct UploadResponseBody {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    image_urls: Option<Vec<String>>,
}

/// Remote summary-generation and session-listing service
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn submit_bundle(&self, bundle: &SubmissionBundle) -> Result<SummaryResponse, ClientError>;

    /// All past sessions, in server order
    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError>;
}

/// HTTP summary/session client
pub struct SummaryClient {
    http_client: reqwest::Client,
    upload_url: String,
    sessions_url: String,
}

impl SummaryClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(SUBMIT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            upload_url: config.endpoint("/upload"),
            sessions_url: config.endpoint("/sessions"),
        })
    }

    fn build_form(bundle: &SubmissionBundle) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for image in &bundle.images {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| {
                    ClientError::ParseError(format!(
                        "invalid content type {:?} for {}: {}",
                        image.content_type, image.file_name, e
                    ))
                })?;
            form = form.part("images", part);
        }

        Ok(form
            .text("employee_name", bundle.employee_name.clone())
            .text("employee_pfp", bundle.employee_pfp.clone())
            .text("date", bundle.date.clone()))
    }
}

/// Only string details are shown to the user
fn detail_message(detail: Option<Value>) -> Option<String> {
    match detail {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Decode session rows one by one, skipping rows that do not fit
fn parse_sessions(body: Value) -> Vec<Session> {
    let Value::Array(rows) = body else {
        tracing::warn!("Session listing is not an array, treating as empty");
        return Vec::new();
    };

    let total = rows.len();
    let sessions: Vec<Session> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Skipping malformed session row: {}", e);
                None
            }
        })
        .collect();

    if sessions.len() < total {
        tracing::warn!(kept = sessions.len(), total, "Some session rows were skipped");
    }
    sessions
}

#[async_trait]
impl SummaryService for SummaryClient {
    async fn submit_bundle(&self, bundle: &SubmissionBundle) -> Result<SummaryResponse, ClientError> {
        let form = Self::build_form(bundle)?;

        tracing::debug!(
            images = bundle.images.len(),
            employee = %bundle.employee_name,
            date = %bundle.date,
            "Submitting image bundle"
        );

        let response = self
            .http_client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;
        let body: UploadResponseBody =
            serde_json::from_str(&text).map_err(|e| ClientError::ParseError(e.to_string()))?;

        match body.summary {
            Some(summary) if status.is_success() && !summary.is_empty() => {
                tracing::info!(chars = summary.len(), "Summary received");
                Ok(SummaryResponse {
                    summary,
                    image_urls: body.image_urls.unwrap_or_default(),
                })
            }
            _ => {
                let detail = detail_message(body.detail);
                tracing::warn!(
                    status = status.as_u16(),
                    detail = detail.as_deref().unwrap_or(""),
                    "Summary request rejected"
                );
                Err(ClientError::ApiError {
                    status: status.as_u16(),
                    detail,
                })
            }
        }
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let response = self
            .http_client
            .get(&self.sessions_url)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                detail: (!error_text.is_empty()).then_some(error_text),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;

        let sessions = parse_sessions(body);
        tracing::debug!(count = sessions.len(), "Sessions fetched");
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sommaire_common::StorageConfig;

    #[test]
    fn test_endpoints_from_config() {
        let config = ClientConfig::new(
            "http://localhost:8000/",
            StorageConfig::new("http://storage", "k", "images"),
        );
        let client = SummaryClient::new(&config).unwrap();
        assert_eq!(client.upload_url, "http://localhost:8000/upload");
        assert_eq!(client.sessions_url, "http://localhost:8000/sessions");
    }

    #[test]
    fn test_form_rejects_invalid_content_type() {
        let bundle = SubmissionBundle {
            images: vec![ImageFile::new("a.png", "not a mime", vec![1])],
            employee_name: "Alice".to_string(),
            employee_pfp: "https://cdn/a.png".to_string(),
            date: "2024-01-02".to_string(),
        };
        assert!(matches!(
            SummaryClient::build_form(&bundle),
            Err(ClientError::ParseError(_))
        ));
    }

    #[test]
    fn test_detail_message_only_for_strings() {
        assert_eq!(detail_message(Some(json!("bad"))), Some("bad".to_string()));
        assert_eq!(detail_message(Some(json!(""))), None);
        assert_eq!(detail_message(Some(json!([{"loc": ["body"]}]))), None);
        assert_eq!(detail_message(None), None);
    }

    #[test]
    fn test_parse_sessions_non_array_is_empty() {
        assert!(parse_sessions(json!({"error": "nope"})).is_empty());
        assert!(parse_sessions(Value::Null).is_empty());
    }

    #[test]
    fn test_parse_sessions_skips_bad_rows() {
        let sessions = parse_sessions(json!([
            {"employee_name": "A", "employee_pfp": "https://x/a.png", "date": "2024-01-02", "summary": "s", "score": "7"},
            {"date": "2024-01-02"},
            {"employee_name": "B", "employee_pfp": null, "date": "2024-01-01", "summary": "t", "score": null}
        ]));
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].score, Some(7));
        assert_eq!(sessions[1].employee_name, "B");
    }

    #[test]
    fn test_parse_sessions_keeps_null_summary_and_date() {
        let mut sessions = parse_sessions(json!([
            {"employee_name": "A", "employee_pfp": "https://x/a.png", "date": "2024-01-02", "summary": "s", "score": 6},
            {"employee_name": "A", "employee_pfp": "https://x/a.png", "date": "2024-01-03", "summary": null, "score": null},
            {"employee_name": "A", "employee_pfp": "https://x/a.png", "date": null, "summary": "undated", "score": null}
        ]));
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[1].summary, "");
        assert_eq!(sessions[2].date, "");
        assert!(sessions[2].parsed_date().is_none());

        let from = chrono::NaiveDate::from_ymd_opt(2024, 1, 3);
        let range = crate::models::DateRange::new(from, None);
        assert!(range.contains(&sessions[2]));

        crate::models::sort_newest_first(&mut sessions);
        let summaries: Vec<_> = sessions.iter().map(|s| s.summary.as_str()).collect();
        assert_eq!(summaries, vec!["", "s", "undated"]);

        let profiles = crate::models::group_sessions(sessions);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].session_count(), 3);
    }
}
