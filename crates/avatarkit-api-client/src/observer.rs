use crate::error::ErrorCategory;

/// Receives session and error notifications from the client.
///
/// Front ends use this to navigate (login page, forbidden page, ...); the
/// default implementation only logs.
pub trait SessionObserver: Send + Sync {
    /// The refresh failed and the session was cleared.
    fn session_expired(&self);

    /// A request failed with a status other than 401.
    fn request_failed(&self, category: ErrorCategory, status: u16, path: &str);
}

/// Observer that reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl SessionObserver for LoggingObserver {
    fn session_expired(&self) {
        tracing::warn!("Session expired, login required");
    }

    fn request_failed(&self, category: ErrorCategory, status: u16, path: &str) {
        match category {
            ErrorCategory::ServerError => {
                tracing::error!(status = status, path = %path, category = %category, "API request failed")
            }
            _ => {
                tracing::warn!(status = status, path = %path, category = %category, "API request failed")
            }
        }
    }
}
