//! Error types for Despatch Bay API calls
//!
//! Every failure is passed through to the caller as-is: transport errors from
//! reqwest, SOAP faults from the carrier, and local file or decode failures.
//! Nothing here is retried or swallowed.

use thiserror::Error;

/// Despatch Bay client error types
#[derive(Debug, Error)]
pub enum DespatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("SOAP fault: {code} - {message}")]
    SoapFault { code: String, message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed SOAP response: {0}")]
    Xml(String),

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request encode error: {0}")]
    Encode(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl DespatchError {
    /// True when the carrier itself rejected the request, as opposed to a
    /// transport or local failure.
    pub fn is_remote(&self) -> bool {
        matches!(self, DespatchError::SoapFault { .. } | DespatchError::ApiError { .. })
    }
}

impl From<quick_xml::Error> for DespatchError {
    fn from(err: quick_xml::Error) -> Self {
        DespatchError::Xml(err.to_string())
    }
}

/// Result type for client operations
pub type DespatchResult<T> = Result<T, DespatchError>;
