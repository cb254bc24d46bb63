use serde_json::Value;
use thiserror::Error;

/// Outcome of a failed API call. Callers match on the variant instead of
/// sniffing the shape of an opaque rejection value.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered outside the 2xx range. `body` is the parsed JSON
    /// error payload when the server sent JSON, otherwise the raw response
    /// text wrapped in a string value.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: Value },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(_) => None,
        }
    }
}
