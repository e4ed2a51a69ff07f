use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// 401 on a request that was already replayed after a refresh.
    #[error("Unauthorized request to {path}")]
    Unauthorized { path: String },

    /// The refresh token was missing or rejected; the session has been cleared.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response as JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Category of a non-auth error status, if this is one.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ClientError::Status { status, .. } => Some(ErrorCategory::from_status(*status)),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Session(err.to_string())
    }
}

/// Coarse classification of failed responses other than 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Forbidden,
    NotFound,
    ServerError,
    Other,
}

impl ErrorCategory {
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => ErrorCategory::Forbidden,
            404 => ErrorCategory::NotFound,
            500 => ErrorCategory::ServerError,
            _ => ErrorCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Forbidden => "forbidden",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::ServerError => "server_error",
            ErrorCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
