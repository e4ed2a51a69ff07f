//! Upload gateway service
//!
//! Pipeline: validate → merge options → choose strategy → forward → normalize.

use std::sync::Arc;

use avatarkit_core::config::UploadConfig;
use avatarkit_core::{
    validate_file, AppError, Config, DeleteResult, ErrorMetadata, FileValidation, LogLevel,
    ResourceKind, TransferProgress, UploadOptions, UploadRequest, UploadResult, ValidationRules,
};
use avatarkit_provider::{create_provider, MediaProvider, UploadParams};

use crate::filename::sanitize_filename;
use crate::strategy::TransferStrategy;

/// Limits and defaults applied by the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub rules: ValidationRules,
    pub large_file_threshold_bytes: u64,
    pub chunk_size_bytes: u64,
    /// Options every upload starts from before caller options are merged in.
    pub defaults: UploadOptions,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::from_upload_config(&UploadConfig::default())
    }
}

impl GatewaySettings {
    pub fn from_upload_config(config: &UploadConfig) -> Self {
        Self {
            rules: config.validation_rules(),
            large_file_threshold_bytes: config.large_file_threshold_bytes,
            chunk_size_bytes: config.chunk_size_bytes,
            defaults: UploadOptions::gateway_defaults(),
        }
    }
}

/// Media upload gateway
///
/// Wraps a [`MediaProvider`] and guarantees that callers always receive an
/// [`UploadResult`] or [`DeleteResult`], never an error.
#[derive(Clone)]
pub struct UploadGateway {
    provider: Arc<dyn MediaProvider>,
    settings: GatewaySettings,
}

impl UploadGateway {
    pub fn new(provider: Arc<dyn MediaProvider>, settings: GatewaySettings) -> Self {
        Self { provider, settings }
    }

    /// Build the gateway and its provider from application configuration.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider = create_provider(config).await?;
        Ok(Self::new(
            provider,
            GatewaySettings::from_upload_config(&config.upload),
        ))
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Check a file against the allow-set and size ceiling without uploading it.
    pub fn validate(&self, file: Option<&UploadRequest>) -> FileValidation {
        FileValidation::from(validate_file(file, &self.settings.rules))
    }

    /// Validate and upload a file.
    pub async fn upload(&self, request: UploadRequest) -> UploadResult {
        self.upload_with_progress(request, &|_| {}).await
    }

    /// Validate and upload a file, reporting transfer progress.
    pub async fn upload_with_progress(
        &self,
        request: UploadRequest,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> UploadResult {
        match self.try_upload(request, progress).await {
            Ok(result) => result,
            Err(err) => {
                log_failure("upload", &err);
                UploadResult::from(err)
            }
        }
    }

    async fn try_upload(
        &self,
        request: UploadRequest,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> Result<UploadResult, AppError> {
        validate_file(Some(&request), &self.settings.rules)?;

        let UploadRequest {
            source,
            content_type,
            size_bytes,
            options,
        } = request;

        let options = options.merged_over(self.settings.defaults.clone());
        let strategy = TransferStrategy::choose(
            size_bytes,
            self.settings.large_file_threshold_bytes,
            options.chunk_size,
            self.settings.chunk_size_bytes,
        );

        let params = UploadParams {
            options,
            content_type,
            file_name: sanitize_filename(&source.file_name()),
            total_bytes: size_bytes,
        };

        tracing::info!(
            file_name = %params.file_name,
            size_bytes = size_bytes,
            strategy = ?strategy,
            provider = %self.provider.backend_type(),
            "Forwarding upload to media provider"
        );

        let asset = match strategy {
            TransferStrategy::SingleShot => {
                self.provider.upload(&source, &params, progress).await?
            }
            TransferStrategy::Chunked { chunk_size } => {
                self.provider
                    .upload_chunked(&source, &params, chunk_size, progress)
                    .await?
            }
        };

        Ok(UploadResult::Success {
            url: asset.secure_url,
            public_id: asset.public_id,
            resource_type: asset.resource_type,
        })
    }

    /// Delete an asset. Failures, including unknown ids, are reported in the
    /// result and never retried.
    pub async fn delete(&self, public_id: &str, resource_kind: ResourceKind) -> DeleteResult {
        if public_id.trim().is_empty() {
            return DeleteResult::failed("Public id is required");
        }

        match self.provider.destroy(public_id, resource_kind).await {
            Ok(()) => DeleteResult::ok(),
            Err(e) => {
                let err = AppError::from(e);
                log_failure("delete", &err);
                DeleteResult::failed(err.client_message())
            }
        }
    }
}

fn log_failure(operation: &str, err: &AppError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            operation = operation,
            error = %err,
            error_code = err.error_code(),
            "Media gateway request rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            operation = operation,
            error = %err,
            error_code = err.error_code(),
            "Media gateway request failed"
        ),
        LogLevel::Error => tracing::error!(
            operation = operation,
            error = %err,
            error_code = err.error_code(),
            "Media gateway request failed"
        ),
    }
}
