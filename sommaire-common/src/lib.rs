//! # Sommaire Common Library
//!
//! Shared code for the Sommaire crates including:
//! - Configuration loading (TOML file, environment, overrides)
//! - Event types (ClientEvent enum) and the EventBus
//! - Logging initialisation
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{ClientConfig, StorageConfig};
pub use error::{Error, Result};
pub use events::{ClientEvent, EventBus};
