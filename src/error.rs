//! snaptask error types

use std::time::Duration;

/// snaptask error types
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The upstream answered 503 while the model warms up.
    #[error("model is loading (503)")]
    ModelLoading {
        estimated_time: Option<Duration>,
        body: String,
    },

    #[error("malformed response body ({status}): {body}")]
    MalformedResponse { status: u16, body: String },

    // Preconditions, detected before any I/O
    #[error("missing Hugging Face token")]
    MissingCredential,

    #[error("missing local relay URL")]
    MissingRelayUrl,

    #[error("missing image reference")]
    MissingImage,

    // Data errors
    #[error("image error: {0}")]
    Image(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SuggestError {
    /// Whether a retry may succeed. Only a warming-up model qualifies;
    /// every other upstream status is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, SuggestError::ModelLoading { .. })
    }

    /// Provider-reported warm-up estimate, if any.
    pub fn estimated_time(&self) -> Option<Duration> {
        match self {
            SuggestError::ModelLoading { estimated_time, .. } => *estimated_time,
            _ => None,
        }
    }

    /// Whether the error was raised before any network call.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SuggestError::MissingCredential
                | SuggestError::MissingRelayUrl
                | SuggestError::MissingImage
        )
    }

    /// HTTP status carried by upstream failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            SuggestError::Api { status, .. } | SuggestError::MalformedResponse { status, .. } => {
                Some(*status)
            }
            SuggestError::ModelLoading { .. } => Some(503),
            _ => None,
        }
    }

    /// Response body carried by upstream failures.
    pub fn body(&self) -> Option<&str> {
        match self {
            SuggestError::Api { body, .. }
            | SuggestError::MalformedResponse { body, .. }
            | SuggestError::ModelLoading { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SuggestError {
    fn from(err: reqwest::Error) -> Self {
        SuggestError::Http(err.to_string())
    }
}

/// Result type alias for snaptask operations
pub type Result<T> = std::result::Result<T, SuggestError>;
