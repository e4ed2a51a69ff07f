//! Error types module
//!
//! `AppError` unifies local validation and provider failures. The gateway
//! never lets one escape: it is folded into an [`UploadResult::Failure`]
//! using the metadata below.

use crate::models::{FailureKind, UploadResult};
use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like oversized payloads
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to report
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PROVIDER_ERROR")
    fn error_code(&self) -> &'static str;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider rejected payload as too large: {0}")]
    ProviderPayloadTooLarge(String),

    #[error("Provider error ({status:?}): {message}")]
    Provider {
        message: String,
        status: Option<u16>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Static metadata for each variant: (http_status, error_code, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (u16, &'static str, Option<&'static str>, LogLevel) {
    match err {
        AppError::Validation(ValidationError::TooLarge { .. }) => (
            413,
            "PAYLOAD_TOO_LARGE",
            Some("Please compress the image before uploading"),
            LogLevel::Debug,
        ),
        AppError::Validation(_) => (400, "VALIDATION_ERROR", None, LogLevel::Debug),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            Some("Check request parameters and try again"),
            LogLevel::Debug,
        ),
        AppError::ProviderPayloadTooLarge(_) => (
            413,
            "PROVIDER_PAYLOAD_TOO_LARGE",
            Some("Try reducing the image size below 10MB or upgrade your plan"),
            LogLevel::Warn,
        ),
        AppError::Provider { status, .. } => (
            status.unwrap_or(500),
            "PROVIDER_ERROR",
            None,
            LogLevel::Error,
        ),
        AppError::Network(_) => (
            502,
            "NETWORK_ERROR",
            Some("Retry after a short delay"),
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            Some("Verify the resource ID exists"),
            LogLevel::Debug,
        ),
        AppError::Config(_) => (500, "CONFIG_ERROR", None, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::ProviderPayloadTooLarge(_) => {
                "Image too large for the media provider".to_string()
            }
            AppError::Provider { message, .. } => message.clone(),
            AppError::Network(_) => "Media provider unreachable".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Config(_) => "Media provider is not configured".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}

impl AppError {
    /// Discriminant carried by the failure envelope.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            AppError::Validation(ValidationError::TooLarge { .. })
            | AppError::ProviderPayloadTooLarge(_) => FailureKind::PayloadTooLarge,
            AppError::Validation(_) | AppError::InvalidInput(_) => FailureKind::Validation,
            AppError::Network(_) => FailureKind::Network,
            AppError::Provider { .. }
            | AppError::NotFound(_)
            | AppError::Config(_) => FailureKind::Provider,
        }
    }
}

impl From<AppError> for UploadResult {
    fn from(err: AppError) -> Self {
        UploadResult::Failure {
            error: err.client_message(),
            kind: err.failure_kind(),
            suggestion: err.suggested_action().map(String::from),
            status_code: Some(err.http_status_code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_size_failure_maps_to_payload_too_large() {
        let err = AppError::from(ValidationError::TooLarge {
            size_bytes: 12 * 1024 * 1024,
            max_mb: 10,
        });
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.failure_kind(), FailureKind::PayloadTooLarge);
        assert_eq!(err.client_message(), "File exceeds 10MB size limit");
        assert_eq!(
            err.suggested_action(),
            Some("Please compress the image before uploading")
        );
    }

    #[test]
    fn provider_too_large_is_distinct_from_generic_provider_error() {
        let too_large = UploadResult::from(AppError::ProviderPayloadTooLarge(
            "File size too large".to_string(),
        ));
        let generic = UploadResult::from(AppError::Provider {
            message: "Invalid API key".to_string(),
            status: Some(401),
        });

        match too_large {
            UploadResult::Failure {
                error,
                kind,
                suggestion,
                status_code,
            } => {
                assert_eq!(kind, FailureKind::PayloadTooLarge);
                assert_eq!(error, "Image too large for the media provider");
                assert!(suggestion.unwrap().contains("upgrade your plan"));
                assert_eq!(status_code, Some(413));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        match generic {
            UploadResult::Failure {
                error,
                kind,
                suggestion,
                status_code,
            } => {
                assert_eq!(kind, FailureKind::Provider);
                assert_eq!(error, "Invalid API key");
                assert!(suggestion.is_none());
                assert_eq!(status_code, Some(401));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn provider_error_without_status_reports_500() {
        let err = AppError::Provider {
            message: "boom".to_string(),
            status: None,
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn network_errors_suggest_retry() {
        let err = AppError::Network("connection refused".to_string());
        assert_eq!(err.suggested_action(), Some("Retry after a short delay"));
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.failure_kind(), FailureKind::Network);
        assert_eq!(err.error_code(), "NETWORK_ERROR");
    }
}
