//! avatarkit core library
//!
//! Domain models, error types, configuration and file validation shared by the
//! upload gateway, the provider backends, the API client and the avatar flow.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod provider_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    DeleteResult, FailureKind, FileValidation, ResourceKind, TransferProgress, Transformation,
    UploadOptions, UploadRequest, UploadResult, UploadSource,
};
pub use provider_types::ProviderBackend;
pub use validation::{validate_file, MediaFile, ValidationError, ValidationRules};
