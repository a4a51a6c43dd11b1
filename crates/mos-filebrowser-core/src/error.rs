//! Engine and host error types.

use mos_filebrowser_config::RowCategory;
use thiserror::Error;

/// Failures reported by a host (document, storage, timers, navigation).
///
/// The engine never propagates these out of a scan; they are logged and the
/// affected row or channel is skipped.
#[derive(Debug, Error)]
pub enum HostError {
    /// Selector could not be parsed or evaluated.
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Document mutation failed.
    #[error("DOM error: {0}")]
    Dom(String),

    /// Session storage unavailable or full.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Router push or location change failed.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Event could not be emitted.
    #[error("Event error: {0}")]
    Event(String),

    /// Timer could not be scheduled.
    #[error("Timer error: {0}")]
    Timer(String),

    /// Document snapshot could not be decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl HostError {
    pub fn selector(selector: &str, message: impl Into<String>) -> Self {
        HostError::Selector {
            selector: selector.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised while building the engine from configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid text pattern for {category} rows: {source}")]
    InvalidPattern {
        category: RowCategory,
        #[source]
        source: regex::Error,
    },
}
