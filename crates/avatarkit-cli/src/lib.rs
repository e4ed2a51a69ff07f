use std::path::Path;

use anyhow::Context;
use avatarkit_core::validation::content_type_for_extension;
use avatarkit_core::UploadRequest;
use serde::Serialize;

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Upload request for a file on disk. The content type comes from
/// `content_type` when given, otherwise from the file extension.
pub async fn request_from_path(
    path: &Path,
    content_type: Option<&str>,
) -> anyhow::Result<UploadRequest> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("Not a file: {}", path.display());
    }

    let content_type = match content_type {
        Some(ct) => ct.to_string(),
        None => {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            content_type_for_extension(name)
                .unwrap_or("application/octet-stream")
                .to_string()
        }
    };

    Ok(UploadRequest::from_path(path, content_type, metadata.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_from_path_reads_size_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.JPG");
        std::fs::write(&path, vec![0u8; 1234]).unwrap();

        let request = request_from_path(&path, None).await.unwrap();
        assert_eq!(request.content_type, "image/jpeg");
        assert_eq!(request.size_bytes, 1234);

        let overridden = request_from_path(&path, Some("image/webp")).await.unwrap();
        assert_eq!(overridden.content_type, "image/webp");
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes");
        std::fs::write(&path, b"x").unwrap();

        let request = request_from_path(&path, None).await.unwrap();
        assert_eq!(request.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_file_and_directory_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(request_from_path(&dir.path().join("nope.png"), None)
            .await
            .is_err());
        assert!(request_from_path(dir.path(), None).await.is_err());
    }
}
