//! Social platform error types.

use thiserror::Error;

/// Errors that can occur when talking to a social platform API.
#[derive(Debug, Error)]
pub enum SocialError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A required credential is not configured
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}
