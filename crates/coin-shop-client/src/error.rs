//! Client error types.

/// Errors that can occur when using the coin shop client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Credentials or token were rejected.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Error message from the response body.
        message: String,
    },

    /// The request was malformed.
    #[error("bad request: {message}")]
    BadRequest {
        /// Error message from the response body.
        message: String,
    },

    /// The balance does not cover the purchase or transfer.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// A protected call was made before authenticating.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status of the failed call, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::BadRequest { .. } => Some(400),
            Self::InsufficientBalance => Some(500),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::NotAuthenticated | Self::Configuration(_) => None,
        }
    }
}
