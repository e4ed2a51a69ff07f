//! File checks shared by the upload gateway and the avatar flow.
//!
//! Every check runs before any network call.

use std::path::Path;

use crate::constants::{DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_MAX_FILE_SIZE_MB, MB};

/// Anything that carries a declared MIME type and a size.
pub trait MediaFile {
    fn content_type(&self) -> &str;

    fn size_bytes(&self) -> u64;

    /// Whether there is no content to upload at all.
    fn is_empty(&self) -> bool {
        self.size_bytes() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No file provided")]
    NoFile,

    #[error("File type not allowed. Allowed types: {}", .allowed.join(", "))]
    DisallowedType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File exceeds {max_mb}MB size limit")]
    TooLarge { size_bytes: u64, max_mb: u64 },
}

/// Allow-set and size ceiling applied to an incoming file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub max_size_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * MB,
            allowed_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ValidationRules {
    pub fn new(max_size_mb: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_size_bytes: max_size_mb * MB,
            allowed_types,
        }
    }

    /// Ceiling in whole megabytes, as shown in error messages.
    pub fn max_size_mb(&self) -> u64 {
        self.max_size_bytes / MB
    }

    pub fn allows(&self, content_type: &str) -> bool {
        let normalized = normalize_mime_type(content_type);
        self.allowed_types
            .iter()
            .any(|ct| normalize_mime_type(ct) == normalized)
    }
}

/// Normalize MIME type by stripping parameters and case
/// (e.g. "Image/JPEG; charset=utf-8" -> "image/jpeg").
///
/// The non-standard `image/jpg` sent by some clients becomes `image/jpeg`.
pub fn normalize_mime_type(content_type: &str) -> String {
    let normalized = content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase();
    if normalized == "image/jpg" {
        return "image/jpeg".to_string();
    }
    normalized
}

/// Check presence, type and size, in that order.
pub fn validate_file<F: MediaFile + ?Sized>(
    file: Option<&F>,
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    let file = match file {
        Some(f) if !f.is_empty() => f,
        _ => return Err(ValidationError::NoFile),
    };

    if !rules.allows(file.content_type()) {
        return Err(ValidationError::DisallowedType {
            content_type: file.content_type().to_string(),
            allowed: rules.allowed_types.clone(),
        });
    }

    if file.size_bytes() > rules.max_size_bytes {
        return Err(ValidationError::TooLarge {
            size_bytes: file.size_bytes(),
            max_mb: rules.max_size_mb(),
        });
    }

    Ok(())
}

/// Content type implied by a file name's extension, for callers that only
/// have a path.
pub fn content_type_for_extension(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(content_type)
}
