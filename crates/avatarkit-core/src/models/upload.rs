use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::UploadOptions;
use crate::validation::MediaFile;

/// Where the upload content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// A file on local disk.
    Path(PathBuf),
    /// An in-memory buffer with the name it was uploaded under.
    Buffer { data: Bytes, original_name: String },
}

impl UploadSource {
    /// File name used when forwarding the content.
    pub fn file_name(&self) -> String {
        match self {
            UploadSource::Path(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string(),
            UploadSource::Buffer { original_name, .. } => original_name.clone(),
        }
    }
}

/// A single file to push through the upload gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub source: UploadSource,
    /// MIME type declared by the sender.
    pub content_type: String,
    pub size_bytes: u64,
    pub options: UploadOptions,
}

impl UploadRequest {
    /// Request for an in-memory buffer; the size is taken from the buffer.
    pub fn from_bytes(
        data: impl Into<Bytes>,
        original_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let data = data.into();
        let size_bytes = data.len() as u64;
        Self {
            source: UploadSource::Buffer {
                data,
                original_name: original_name.into(),
            },
            content_type: content_type.into(),
            size_bytes,
            options: UploadOptions::default(),
        }
    }

    /// Request for a file on disk whose size the caller already knows.
    pub fn from_path(
        path: impl AsRef<Path>,
        content_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            source: UploadSource::Path(path.as_ref().to_path_buf()),
            content_type: content_type.into(),
            size_bytes,
            options: UploadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }
}

impl MediaFile for UploadRequest {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    fn is_empty(&self) -> bool {
        match &self.source {
            UploadSource::Buffer { data, .. } => data.is_empty(),
            UploadSource::Path(path) => path.as_os_str().is_empty(),
        }
    }
}
