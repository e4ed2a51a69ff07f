//! Normalized outcomes returned across the gateway boundary.

use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::validation::ValidationError;

/// Why an upload failed. Callers branch on this instead of matching messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected before any network call (missing file, bad type).
    Validation,
    /// File over the local ceiling or refused by the provider as too large.
    PayloadTooLarge,
    /// Any other provider-reported failure.
    Provider,
    /// The provider could not be reached.
    Network,
}

/// Result of an upload: exactly one of success or failure.
///
/// Serializes as `{"success": true, "url", "public_id", "resource_type"}` or
/// `{"success": false, "error", "kind", "suggestion"?, "code"?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "UploadEnvelope", try_from = "UploadEnvelope")]
pub enum UploadResult {
    Success {
        url: String,
        public_id: String,
        resource_type: ResourceKind,
    },
    Failure {
        error: String,
        kind: FailureKind,
        suggestion: Option<String>,
        status_code: Option<u16>,
    },
}

impl UploadResult {
    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        UploadResult::Failure {
            error: error.into(),
            kind,
            suggestion: None,
            status_code: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }

    /// Hosted URL of a successful upload.
    pub fn url(&self) -> Option<&str> {
        match self {
            UploadResult::Success { url, .. } => Some(url),
            UploadResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UploadResult::Success { .. } => None,
            UploadResult::Failure { error, .. } => Some(error),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            UploadResult::Success { .. } => None,
            UploadResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct UploadEnvelope {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_type: Option<ResourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    #[serde(default, rename = "code", skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
}

impl From<UploadResult> for UploadEnvelope {
    fn from(result: UploadResult) -> Self {
        match result {
            UploadResult::Success {
                url,
                public_id,
                resource_type,
            } => UploadEnvelope {
                success: true,
                url: Some(url),
                public_id: Some(public_id),
                resource_type: Some(resource_type),
                error: None,
                kind: None,
                suggestion: None,
                status_code: None,
            },
            UploadResult::Failure {
                error,
                kind,
                suggestion,
                status_code,
            } => UploadEnvelope {
                success: false,
                url: None,
                public_id: None,
                resource_type: None,
                error: Some(error),
                kind: Some(kind),
                suggestion,
                status_code,
            },
        }
    }
}

impl TryFrom<UploadEnvelope> for UploadResult {
    type Error = String;

    fn try_from(envelope: UploadEnvelope) -> Result<Self, Self::Error> {
        if envelope.success {
            match (envelope.url, envelope.public_id) {
                (Some(url), Some(public_id)) => Ok(UploadResult::Success {
                    url,
                    public_id,
                    resource_type: envelope.resource_type.unwrap_or(ResourceKind::Image),
                }),
                _ => Err("successful upload result requires url and public_id".to_string()),
            }
        } else {
            Ok(UploadResult::Failure {
                error: envelope
                    .error
                    .unwrap_or_else(|| "Image upload failed".to_string()),
                kind: envelope.kind.unwrap_or(FailureKind::Provider),
                suggestion: envelope.suggestion,
                status_code: envelope.status_code,
            })
        }
    }
}

/// Outcome of deleting an asset from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// `{valid, error?}` answer of a standalone file check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), ValidationError>> for FileValidation {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => FileValidation {
                valid: true,
                error: None,
            },
            Err(e) => FileValidation {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }
}
