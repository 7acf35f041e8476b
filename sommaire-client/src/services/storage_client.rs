//! Object-storage client for profile pictures
//!
//! One `PUT {project}/storage/v1/object/{bucket}/{key}` per picture, with
//! bearer auth and `x-upsert: true` so a repeated key overwrites instead of
//! conflicting. The public URL is derived from the key, not read from the
//! response.

use crate::error::ClientError;
use crate::models::ImageFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sommaire_common::StorageConfig;
use std::time::Duration;

const USER_AGENT: &str = concat!("sommaire/", env!("CARGO_PKG_VERSION"));
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Where profile pictures go
#[async_trait]
pub trait ProfilePictureStore: Send + Sync {
    /// Upload `picture` and return its public URL
    async fn upload_profile_picture(&self, picture: &ImageFile) -> Result<String, ClientError>;
}

/// Object key: `{utc millis}_{file name}`, with characters outside
/// `[A-Za-z0-9._-]` replaced by `_`
pub fn object_key(file_name: &str, now: DateTime<Utc>) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = if sanitized.is_empty() {
        "picture".to_string()
    } else {
        sanitized
    };
    format!("{}_{}", now.timestamp_millis(), sanitized)
}

/// HTTP object-storage client
pub struct StorageClient {
    http_client: reqwest::Client,
    storage: StorageConfig,
}

impl StorageClient {
    pub fn new(storage: StorageConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            storage,
        })
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }
}

#[async_trait]
impl ProfilePictureStore for StorageClient {
    async fn upload_profile_picture(&self, picture: &ImageFile) -> Result<String, ClientError> {
        let key = object_key(&picture.file_name, Utc::now());
        let upload_url = self.storage.object_url(&key);

        tracing::debug!(
            key = %key,
            content_type = %picture.content_type,
            bytes = picture.len(),
            "Uploading profile picture"
        );

        let response = self
            .http_client
            .put(&upload_url)
            .bearer_auth(&self.storage.access_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, picture.content_type.as_str())
            .body(picture.bytes.clone())
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %error_text,
                "Profile picture upload failed"
            );
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                detail: (!error_text.is_empty()).then_some(error_text),
            });
        }

        let public_url = self.storage.public_url(&key);
        tracing::info!(url = %public_url, "Profile picture uploaded");
        Ok(public_url)
    }
}
