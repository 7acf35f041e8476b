//! Configuration loading and endpoint resolution
//!
//! Every value the client needs to reach its collaborators (summary API base,
//! storage project URL, storage access key, bucket) is resolved in this
//! priority order:
//! 1. Explicit override (command-line argument)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (bucket and log level only)
//!
//! The result is a [`ClientConfig`] that is passed to the service clients at
//! construction; nothing downstream reads the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file path
pub const ENV_CONFIG_PATH: &str = "SOMMAIRE_CONFIG";
/// Environment variable for the summary/session API base URL
pub const ENV_API_BASE: &str = "SOMMAIRE_API_BASE";
/// Environment variable for the storage project URL
pub const ENV_STORAGE_URL: &str = "SOMMAIRE_STORAGE_URL";
/// Environment variable for the storage access key
pub const ENV_STORAGE_KEY: &str = "SOMMAIRE_STORAGE_KEY";
/// Environment variable for the storage bucket name
pub const ENV_STORAGE_BUCKET: &str = "SOMMAIRE_STORAGE_BUCKET";

/// Bucket used when none is configured
pub const DEFAULT_BUCKET: &str = "images";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Storage section of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

/// On-disk configuration (`~/.config/sommaire/config.toml`)
///
/// All fields are optional; a missing file is equivalent to `TomlConfig::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line (highest priority)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub storage_url: Option<String>,
    pub storage_key: Option<String>,
    pub bucket: Option<String>,
}

/// Object-storage coordinates for profile pictures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub project_url: String,
    /// Bearer credential for uploads
    pub access_key: String,
    pub bucket: String,
}

impl StorageConfig {
    pub fn new(
        project_url: impl Into<String>,
        access_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            project_url: trim_base(project_url.into()),
            access_key: access_key.into(),
            bucket: bucket.into(),
        }
    }

    /// Upload target: `{project}/storage/v1/object/{bucket}/{key}`
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.project_url, self.bucket, key)
    }

    /// Public read URL: `{project}/storage/v1/object/public/{bucket}/{key}`
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.project_url, self.bucket, key
        )
    }
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the summary/session API (no trailing slash)
    pub api_base_url: String,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>, storage: StorageConfig) -> Self {
        Self {
            api_base_url: trim_base(api_base_url.into()),
            storage,
            logging: LoggingConfig::default(),
        }
    }

    /// Resolve configuration from overrides, environment, and TOML
    pub fn resolve(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let api_base_url = resolve_value(
            "api_base_url",
            overrides.api_base_url.as_deref(),
            ENV_API_BASE,
            toml_config.api_base_url.as_deref(),
        )
        .ok_or_else(|| missing("summary API base URL", "--api-base", ENV_API_BASE, "api_base_url"))?;

        let storage_url = resolve_value(
            "storage.url",
            overrides.storage_url.as_deref(),
            ENV_STORAGE_URL,
            toml_config.storage.url.as_deref(),
        )
        .ok_or_else(|| missing("storage project URL", "--storage-url", ENV_STORAGE_URL, "storage.url"))?;

        let storage_key = resolve_value(
            "storage.key",
            overrides.storage_key.as_deref(),
            ENV_STORAGE_KEY,
            toml_config.storage.key.as_deref(),
        )
        .ok_or_else(|| missing("storage access key", "--storage-key", ENV_STORAGE_KEY, "storage.key"))?;

        let bucket = resolve_value(
            "storage.bucket",
            overrides.bucket.as_deref(),
            ENV_STORAGE_BUCKET,
            toml_config.storage.bucket.as_deref(),
        )
        .unwrap_or_else(|| DEFAULT_BUCKET.to_string());

        let mut config = Self::new(api_base_url, StorageConfig::new(storage_url, storage_key, bucket));
        config.logging = toml_config.logging.clone();

        info!(
            api_base = %config.api_base_url,
            bucket = %config.storage.bucket,
            "Client configuration resolved"
        );
        Ok(config)
    }

    /// Absolute URL for an API path such as `/upload`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn missing(what: &str, flag: &str, env_var: &str, toml_key: &str) -> Error {
    Error::Config(format!(
        "{} not configured. Please configure using one of:\n\
         1. Command line: {} <value>\n\
         2. Environment: {}=<value>\n\
         3. TOML config: ~/.config/sommaire/config.toml ({} = \"...\")",
        what, flag, env_var, toml_key
    ))
}

/// Pick the first non-blank value by priority: override, environment, TOML
fn resolve_value(
    name: &str,
    cli: Option<&str>,
    env_var: &str,
    toml_value: Option<&str>,
) -> Option<String> {
    if let Some(value) = cli.filter(|v| is_valid_value(v)) {
        debug!("{} taken from command line", name);
        return Some(value.trim().to_string());
    }

    if let Ok(value) = std::env::var(env_var) {
        if is_valid_value(&value) {
            debug!("{} taken from environment ({})", name, env_var);
            return Some(value.trim().to_string());
        }
    }

    if let Some(value) = toml_value.filter(|v| is_valid_value(v)) {
        debug!("{} taken from TOML config", name);
        return Some(value.trim().to_string());
    }

    None
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sommaire").join("config.toml"))
}

/// Config file to read: explicit path, then `SOMMAIRE_CONFIG`, then the platform default
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        if is_valid_value(&path) {
            return Some(PathBuf::from(path));
        }
    }
    default_config_path()
}

/// Load the TOML config file
///
/// A missing file is not an error: a warning is logged and defaults are used.
/// An unreadable or malformed file is reported as `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write the TOML config atomically (temp file + rename)
///
/// The file holds the storage key, so on Unix it is written with mode 0600.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&temp_path, path)?;
    info!("Config written to {}", path.display());
    Ok(())
}
