// Error taxonomy for calls against the prime generation service.
// Every remote operation on `PrimesClient` returns one of these instead of
// printing or panicking; the UI decides how to present them.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by `PrimesClient` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure or per-request timeout.
    #[error("connection error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service does not know the identifier (HTTP 404 on status/result).
    #[error("request not found: {id}")]
    NotFound { id: String },
    /// Any other non-200 answer from the service.
    #[error("server answered {status}: {message}")]
    Server { status: StatusCode, message: String },
    /// Response body was not valid JSON or lacked a required field.
    #[error("failed to decode {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Returns true when the service reported an unknown identifier.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// Invalid client configuration detected at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
