//! Error types for the check-in relay.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while relaying a check-in request.
#[derive(Error, Debug)]
pub enum Error {
    /// A required parameter is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// Verb outside GET, POST and OPTIONS
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// Any failure from the Notion API call
    #[error("{0}")]
    Upstream(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::MethodNotAllowed(_) => 405,
            _ => 500,
        }
    }

    /// Caller-facing summary for the `message` field of an error body.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::MethodNotAllowed(_) => "Method Not Allowed".to_string(),
            Error::Upstream(_) => {
                "Notion API call failed (check the API key, integration access and database ID)"
                    .to_string()
            }
            Error::Config(_) | Error::Serialization(_) => "Internal server error".to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL; it carries the database ID and nothing useful for the caller.
        Error::Upstream(err.without_url().to_string())
    }
}
