//! Error types for per-city fetches.

use serde::Serialize;
use thiserror::Error;

/// Why a single city's reading could not be produced.
///
/// These never abort a poll; each one ends up on that city's error card.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-2xx status.
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Upstream answered 2xx but reported a failure in its payload.
    #[error("API error: {0}")]
    Api(String),

    /// The payload did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure injected by the synthetic source.
    #[error("{0}")]
    Simulated(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}
