use avatarkit_core::ValidationError;
use thiserror::Error;

/// Failures surfaced to the user by the avatar flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarError {
    #[error("No image selected")]
    NoFile,

    #[error("Please upload a valid image (JPEG, PNG, JPG, GIF, or WEBP)")]
    InvalidType,

    #[error("Image exceeds {max_mb}MB limit. Please choose a smaller file.")]
    TooLarge { max_mb: u64 },

    #[error("An avatar upload is already in progress")]
    Busy,

    #[error("{0}")]
    Upload(String),

    #[error("Failed to update profile: {0}")]
    ProfileUpdate(String),
}

impl From<ValidationError> for AvatarError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NoFile => AvatarError::NoFile,
            ValidationError::DisallowedType { .. } => AvatarError::InvalidType,
            ValidationError::TooLarge { max_mb, .. } => AvatarError::TooLarge { max_mb },
        }
    }
}
