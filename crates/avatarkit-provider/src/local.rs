use crate::source::{read_all, ChunkReader};
use crate::traits::{MediaProvider, ProviderAsset, ProviderError, ProviderResult, UploadParams};
use async_trait::async_trait;
use avatarkit_core::{ProviderBackend, ResourceKind, TransferProgress, UploadSource};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem media provider for development and tests.
///
/// Transformations are accepted but not applied; files are stored as sent.
#[derive(Clone)]
pub struct LocalProvider {
    base_path: PathBuf,
    base_url: String,
}

impl LocalProvider {
    /// Create a new LocalProvider instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored assets (e.g., "/var/lib/avatarkit/media")
    /// * `base_url` - Base URL the assets are served from (e.g., "http://localhost:5001/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> ProviderResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            ProviderError::ConfigError(format!(
                "Failed to create media directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalProvider {
            base_path,
            base_url,
        })
    }

    /// Storage key of an asset: `{resource_kind}/{public_id}`.
    ///
    /// Rejects ids that could escape the base directory.
    fn key_for(public_id: &str, kind: ResourceKind) -> ProviderResult<String> {
        if public_id.is_empty() || public_id.contains("..") || public_id.starts_with('/') {
            return Err(ProviderError::InvalidKey(
                "Public id contains invalid characters".to_string(),
            ));
        }
        Ok(format!("{}/{}", kind, public_id))
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    fn generate_public_id(params: &UploadParams) -> String {
        let name = Uuid::new_v4().simple().to_string();
        match params.options.folder.as_deref().map(|f| f.trim_matches('/')) {
            Some(folder) if !folder.is_empty() => format!("{}/{}", folder, name),
            _ => name,
        }
    }

    /// Concrete kind for a new asset; `auto` is resolved from the content type.
    fn resolve_kind(params: &UploadParams) -> ResourceKind {
        match params.resource_kind() {
            ResourceKind::Auto => ResourceKind::for_content_type(&params.content_type),
            other => other,
        }
    }

    /// Generate public URL for an asset
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> ProviderResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn asset(&self, key: &str, public_id: String, kind: ResourceKind, size: u64) -> ProviderAsset {
        ProviderAsset {
            secure_url: self.generate_url(key),
            public_id,
            resource_type: kind,
            bytes: Some(size),
            format: None,
        }
    }

    /// Copy every chunk of `reader` into a new file at `path`; returns bytes written.
    async fn write_chunks(
        path: &Path,
        reader: &mut ChunkReader,
        chunk_size: u64,
        params: &UploadParams,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> ProviderResult<u64> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            ProviderError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let mut written: u64 = 0;
        while let Some(chunk) = reader.next_chunk(chunk_size as usize).await? {
            file.write_all(&chunk).await.map_err(|e| {
                ProviderError::UploadFailed(format!(
                    "Failed to write chunk to {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
            progress(TransferProgress::new(written, params.total_bytes));
        }

        file.sync_all().await.map_err(|e| {
            ProviderError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        Ok(written)
    }

    fn reject_if_options_invalid(params: &UploadParams) -> ProviderResult<()> {
        if let Some(folder) = params.options.folder.as_deref() {
            if folder.contains("..") {
                return Err(ProviderError::InvalidKey(
                    "Folder contains invalid path traversal".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MediaProvider for LocalProvider {
    async fn upload(
        &self,
        source: &UploadSource,
        params: &UploadParams,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> ProviderResult<ProviderAsset> {
        Self::reject_if_options_invalid(params)?;
        let kind = Self::resolve_kind(params);
        let public_id = Self::generate_public_id(params);
        let key = Self::key_for(&public_id, kind)?;
        let path = self.key_to_path(&key);

        let data = read_all(source).await?;
        let size = data.len() as u64;
        progress(TransferProgress::new(0, size));

        self.ensure_parent_dir(&path).await?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            ProviderError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            ProviderError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            ProviderError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        progress(TransferProgress::new(size, size));

        tracing::info!(
            path = %path.display(),
            public_id = %public_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local media upload successful"
        );

        Ok(self.asset(&key, public_id, kind, size))
    }

    async fn upload_chunked(
        &self,
        source: &UploadSource,
        params: &UploadParams,
        chunk_size: u64,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> ProviderResult<ProviderAsset> {
        if chunk_size == 0 {
            return Err(ProviderError::ConfigError(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        Self::reject_if_options_invalid(params)?;
        let kind = Self::resolve_kind(params);
        let public_id = Self::generate_public_id(params);
        let key = Self::key_for(&public_id, kind)?;
        let path = self.key_to_path(&key);
        let start = std::time::Instant::now();

        let mut reader = ChunkReader::open(source).await?;
        self.ensure_parent_dir(&path).await?;
        progress(TransferProgress::new(0, params.total_bytes));

        let written = match Self::write_chunks(&path, &mut reader, chunk_size, params, progress).await
        {
            Ok(written) => written,
            Err(e) => {
                // no partial assets
                if let Err(cleanup) = fs::remove_file(&path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %path.display(),
                            error = %cleanup,
                            "Failed to remove partial upload"
                        );
                    }
                }
                return Err(e);
            }
        };

        tracing::info!(
            path = %path.display(),
            public_id = %public_id,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local media chunked upload successful"
        );

        Ok(self.asset(&key, public_id, kind, written))
    }

    async fn destroy(&self, public_id: &str, resource_kind: ResourceKind) -> ProviderResult<()> {
        let kind = match resource_kind {
            ResourceKind::Auto => ResourceKind::Image,
            other => other,
        };
        let key = Self::key_for(public_id, kind)?;
        let path = self.key_to_path(&key);

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ProviderError::NotFound(public_id.to_string()));
        }

        fs::remove_file(&path).await.map_err(|e| {
            ProviderError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            public_id = %public_id,
            "Local media delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> ProviderBackend {
        ProviderBackend::Local
    }
}
