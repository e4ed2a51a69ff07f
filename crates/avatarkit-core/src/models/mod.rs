//! Data models for the upload pipeline
//!
//! Requests and options flow into the gateway; results and delete outcomes
//! flow back out as serializable envelopes.

mod options;
mod progress;
mod resource;
mod result;
mod upload;

pub use options::{Transformation, UploadOptions};
pub use progress::TransferProgress;
pub use resource::ResourceKind;
pub use result::{DeleteResult, FailureKind, FileValidation, UploadResult};
pub use upload::{UploadRequest, UploadSource};
