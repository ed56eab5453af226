//! Client error types and result alias.

use serde_json::Value;
use thiserror::Error;

use crate::services::validation::flatten_error_messages;

/// Crate-wide result type alias
pub type Result<T> = std::result::Result<T, TroviError>;

/// Client error types
#[derive(Error, Debug)]
pub enum TroviError {
    /// URN does not have the `urn:trovi:<type>:<provider>:...` shape
    #[error("Malformed URN: {0}")]
    MalformedUrn(String),

    /// URN is well-formed but its type segment is not recognized
    #[error("Unknown URN type: {0}")]
    UnknownUrnType(String),

    /// URN is not a Zenodo contents URN carrying a DOI
    #[error("Invalid DOI URN: {0}")]
    InvalidDoiUrn(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure from the HTTP client
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response without a field-error body
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Server-reported field errors on create/update
    #[error("Validation failed:\n{}", flatten_error_messages(.0))]
    Validation(Value),

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation requires an access token and none is available
    #[error("Not authenticated")]
    NotAuthenticated,
}
