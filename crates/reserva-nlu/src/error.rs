//! Error types for NLU providers.

/// Errors raised while talking to an NLU provider.
///
/// These never reach the chat flow; adapters recover them into an
/// unknown guess.
#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Failed to parse provider output: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for NluError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs are dropped from the message.
        NluError::Http(err.without_url())
    }
}

impl From<serde_json::Error> for NluError {
    fn from(err: serde_json::Error) -> Self {
        NluError::Parse(err.to_string())
    }
}
