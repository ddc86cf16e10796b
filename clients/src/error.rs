//! Client Error Types
//!
//! [`ClientError`] covers every way a call to the REST API can fail. The
//! orchestrator never inspects the variants beyond logging or surfacing the
//! message; per-student grading failures only keep the rendered text.

/// Errors raised by the HTTP adapters.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The credential capability could not produce a usable token.
    #[error("Credential unavailable: {0}")]
    Credential(String),

    /// The request never produced a response (connect, timeout, TLS...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected schema.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
