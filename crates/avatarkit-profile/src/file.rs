use std::path::Path;

use avatarkit_core::constants::DEFAULT_MAX_FILE_SIZE_MB;
use avatarkit_core::validation::{content_type_for_extension, normalize_mime_type};
use avatarkit_core::{
    validate_file, MediaFile, Transformation, UploadOptions, UploadRequest, ValidationRules,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::AvatarError;

const AVATAR_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/gif",
    "image/webp",
];

const AVATAR_FOLDER: &str = "profile_pictures";
const AVATAR_SIZE_PX: u32 = 500;

/// An image picked by the user, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    data: Bytes,
    file_name: String,
    content_type: String,
}

impl AvatarFile {
    pub fn new(
        data: impl Into<Bytes>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Read an image from disk; the content type is derived from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("avatar")
            .to_string();
        let content_type = content_type_for_extension(&file_name)
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self::new(data, file_name, content_type))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// `data:` URL of the image, for display before the upload finishes.
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.data)
        )
    }

    /// Request for the gateway, with the content type in canonical form.
    pub fn into_upload_request(self, options: UploadOptions) -> UploadRequest {
        let content_type = normalize_mime_type(&self.content_type);
        UploadRequest::from_bytes(self.data, self.file_name, content_type)
            .with_options(options)
    }
}

impl MediaFile for AvatarFile {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Types and size accepted for profile pictures.
pub fn avatar_rules() -> ValidationRules {
    ValidationRules::new(
        DEFAULT_MAX_FILE_SIZE_MB,
        AVATAR_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
    )
}

pub fn validate_avatar(file: &AvatarFile) -> Result<(), AvatarError> {
    validate_file(Some(file), &avatar_rules())?;
    Ok(())
}

/// Upload options for profile pictures: square face-centered crop.
pub fn avatar_upload_options() -> UploadOptions {
    UploadOptions::default()
        .with_folder(AVATAR_FOLDER)
        .with_transformation(vec![Transformation::face_fill(
            AVATAR_SIZE_PX,
            AVATAR_SIZE_PX,
        )])
}
