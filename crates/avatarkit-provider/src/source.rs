//! Sequential access to upload content, whole or in chunks.

use avatarkit_core::UploadSource;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::traits::{ProviderError, ProviderResult};

/// Read the full content of a source.
pub(crate) async fn read_all(source: &UploadSource) -> ProviderResult<Bytes> {
    match source {
        UploadSource::Buffer { data, .. } => Ok(data.clone()),
        UploadSource::Path(path) => fs::read(path).await.map(Bytes::from).map_err(|e| {
            ProviderError::UploadFailed(format!("Failed to read file {}: {}", path.display(), e))
        }),
    }
}

/// Yields a source's content in fixed-size chunks without loading a file
/// into memory at once.
pub(crate) enum ChunkReader {
    Buffer { data: Bytes, offset: usize },
    /// `remaining` bounds each read buffer to what is left of the file.
    File { file: fs::File, remaining: u64 },
}

impl ChunkReader {
    pub(crate) async fn open(source: &UploadSource) -> ProviderResult<Self> {
        match source {
            UploadSource::Buffer { data, .. } => Ok(ChunkReader::Buffer {
                data: data.clone(),
                offset: 0,
            }),
            UploadSource::Path(path) => {
                let file = fs::File::open(path).await.map_err(|e| {
                    ProviderError::UploadFailed(format!(
                        "Failed to open file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let remaining = file.metadata().await?.len();
                Ok(ChunkReader::File { file, remaining })
            }
        }
    }

    /// Next chunk of at most `chunk_size` bytes; `None` once exhausted.
    pub(crate) async fn next_chunk(&mut self, chunk_size: usize) -> ProviderResult<Option<Bytes>> {
        match self {
            ChunkReader::Buffer { data, offset } => {
                if *offset >= data.len() {
                    return Ok(None);
                }
                let end = offset.saturating_add(chunk_size).min(data.len());
                let chunk = data.slice(*offset..end);
                *offset = end;
                Ok(Some(chunk))
            }
            ChunkReader::File { file, remaining } => {
                let capacity = (*remaining).min(chunk_size as u64) as usize;
                if capacity == 0 {
                    return Ok(None);
                }
                let mut buf = vec![0u8; capacity];
                let mut filled = 0;
                while filled < capacity {
                    let n = file.read(&mut buf[filled..]).await?;
                    if n == 0 {
                        break;
                    }
                    filled += n;
                }
                if filled == 0 {
                    return Ok(None);
                }
                buf.truncate(filled);
                *remaining -= filled as u64;
                Ok(Some(Bytes::from(buf)))
            }
        }
    }
}
