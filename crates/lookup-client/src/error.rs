//! Lookup errors.

use thiserror::Error;

/// Errors raised while talking to a provider or parsing input.
///
/// These never escape [`crate::LookupAggregator::lookup`]; they are folded
/// into the result as missing data or inline error markers.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Request did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider answered with a non-success status.
    #[error("Provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// Input could not be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Phone number could not be parsed.
    #[error("Phone parse error: {0}")]
    PhoneParse(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Http(e)
        }
    }
}
