//! Media provider abstraction trait
//!
//! This module defines the MediaProvider trait that all provider backends must implement.

use async_trait::async_trait;
use avatarkit_core::{
    AppError, ProviderBackend, ResourceKind, TransferProgress, UploadOptions, UploadSource,
};
use thiserror::Error;

/// Provider operation errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid public id: {0}")]
    InvalidKey(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::PayloadTooLarge(msg) => AppError::ProviderPayloadTooLarge(msg),
            ProviderError::Http { status, message } => AppError::Provider {
                message,
                status: Some(status),
            },
            ProviderError::NotFound(id) => AppError::NotFound(format!("Asset not found: {}", id)),
            ProviderError::Transport(msg) => AppError::Network(msg),
            ProviderError::ConfigError(msg) => AppError::Config(msg),
            ProviderError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other @ (ProviderError::UploadFailed(_)
            | ProviderError::DeleteFailed(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::IoError(_)) => AppError::Provider {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

/// Everything a backend needs to know about one upload besides its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    /// Options after merging caller values over the gateway defaults.
    pub options: UploadOptions,
    pub content_type: String,
    pub file_name: String,
    pub total_bytes: u64,
}

impl UploadParams {
    /// Resource kind requested by the options (`auto` when unset).
    pub fn resource_kind(&self) -> ResourceKind {
        self.options.resource_type.unwrap_or_default()
    }
}

/// An asset as stored by the provider.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ProviderAsset {
    pub secure_url: String,
    pub public_id: String,
    pub resource_type: ResourceKind,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub format: Option<String>,
}

/// Media provider abstraction trait
///
/// The upload gateway talks to the external media host only through this
/// trait, so tests can substitute a recording fake.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Upload the whole content in a single request.
    async fn upload(
        &self,
        source: &UploadSource,
        params: &UploadParams,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> ProviderResult<ProviderAsset>;

    /// Upload the content as a sequence of `chunk_size` pieces.
    ///
    /// Used for large files that would exceed the provider's request-body limit.
    async fn upload_chunked(
        &self,
        source: &UploadSource,
        params: &UploadParams,
        chunk_size: u64,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> ProviderResult<ProviderAsset>;

    /// Delete an asset. Unknown ids yield `ProviderError::NotFound`.
    async fn destroy(&self, public_id: &str, resource_kind: ResourceKind) -> ProviderResult<()>;

    /// Get the provider backend type
    fn backend_type(&self) -> ProviderBackend;
}
