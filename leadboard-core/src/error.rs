//! Error types for leadboard-core

use thiserror::Error;

/// Main error type for the leadboard-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Leads API answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Leads API answered 2xx but reported `success: false`
    #[error("request rejected by leads API: {0}")]
    Rejected(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Leads API has no lead with this id
    #[error("lead not found: {0}")]
    LeadNotFound(String),
}

/// Result type alias for leadboard-core
pub type Result<T> = std::result::Result<T, Error>;
