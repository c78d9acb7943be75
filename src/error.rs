//! Custom error types for docqa

use crate::api::ApiOperation;
use thiserror::Error;

/// Main error type for docqa operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-success status from one of the backend endpoints
    #[error("{operation} (HTTP {status})")]
    Fetch { operation: ApiOperation, status: u16 },

    /// Upload rejected by the backend; carries the backend's own message
    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Validation(String),

    /// The backend could not be reached or refused a required call
    #[error("{0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),
}

impl Error {
    /// True for errors produced by a backend call (status or transport)
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Fetch { .. } | Error::Upload(_) | Error::Backend(_) | Error::Http(_))
    }

    /// Follow-up advice printed under a fatal error, if any
    pub fn hint(&self) -> Option<&'static str> {
        self.is_network().then_some(BACKEND_HINT)
    }
}

/// Shown after a failed backend call
pub const BACKEND_HINT: &str =
    "Check that the backend is running and that --api-url (or DOCQA_API_BASE_URL) points at it.";

/// Result type alias for docqa
pub type Result<T> = std::result::Result<T, Error>;
