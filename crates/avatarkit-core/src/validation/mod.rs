//! Validation modules

pub mod file;

pub use file::{
    content_type_for_extension, normalize_mime_type, validate_file, MediaFile, ValidationError,
    ValidationRules,
};
