use thiserror::Error;

/// Errors returned by the webhook client.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request was cancelled after the configured timeout.
    #[error("{endpoint} webhook timed out after {timeout_ms}ms")]
    Timeout {
        endpoint: &'static str,
        timeout_ms: u64,
    },

    /// The webhook answered with a non-2xx status.
    #[error("{endpoint} webhook returned HTTP {status}")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },

    #[error("invalid webhook URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request was rejected locally and never sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
