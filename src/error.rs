//! Error types for the Ripple gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Ripple gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Request authentication failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Webhook payload could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Slack Web API failure
    #[error("slack api error: {0}")]
    Slack(String),

    /// Completion endpoint failure
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Webhook request authentication failures.
///
/// `MissingSecret` is an operator fault and maps to HTTP 500; the other two
/// are client-forgeable conditions and map to HTTP 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Request timestamp outside the replay window
    #[error("request timestamp outside the replay window")]
    ExpiredTimestamp,

    /// Signature header absent or does not match the computed HMAC
    #[error("request signature mismatch")]
    SignatureMismatch,

    /// No signing secret configured
    #[error("signing secret not configured")]
    MissingSecret,
}

/// Failures from the remote completion endpoint. Never retried.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Endpoint answered with a non-2xx status
    #[error("completion endpoint returned status {0}")]
    Upstream(reqwest::StatusCode),

    /// Network-level failure before a status was received
    #[error("completion transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response without a usable `choices[0].message.content`
    #[error("completion response missing reply content")]
    EmptyReply,
}
