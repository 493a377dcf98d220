//! Errors raised while talking to the table service.

use thiserror::Error;

/// Failure of a single call against the remote table.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (unreachable host, TLS, timeout).
    #[error("could not reach the table service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or the canonical reason when the body is empty.
        message: String,
    },

    /// The response body did not match the expected row schema.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Human-readable message shown to the user for a failed `action`
    /// (e.g. "loading tasks").
    ///
    /// Transport failures get a dedicated message since the usual cause is
    /// the environment, not the request.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            ApiError::Transport(e) if e.is_timeout() => format!(
                "Error {}: the table service did not answer in time. Check your connection and press r to retry.",
                action
            ),
            ApiError::Transport(_) => format!(
                "Connection to the table service failed while {}. Check the configured base_url and your network, or use the Baserow web interface directly.",
                action
            ),
            other => format!("Error {}: {}", action, other),
        }
    }
}
