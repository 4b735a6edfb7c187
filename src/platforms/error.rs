//! Errors from the platform clients.

/// Error type for platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// A required credential environment variable is not set
    #[error("missing credential: set the {0} environment variable")]
    MissingCredential(String),
    /// Login was refused
    #[error("{platform} login failed: {reason}")]
    Auth {
        /// Platform name
        platform: &'static str,
        /// Why the login was refused
        reason: String,
    },
    /// Network error
    #[error("network error: {0}")]
    Network(String),
    /// HTTP error with status code
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// The platform answered with something we could not understand
    #[error("parse error: {0}")]
    Parse(String),
    /// The platform rejected a request with a message
    #[error("{0}")]
    Rejected(String),
    /// A course, assignment or student the request refers to does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http(status.as_u16(), err.to_string()),
            None if err.is_decode() => Self::Parse(err.to_string()),
            None => Self::Network(err.to_string()),
        }
    }
}
