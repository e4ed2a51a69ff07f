//! avatarkit media provider library
//!
//! This crate provides the `MediaProvider` trait and its implementations: a
//! hosted image service reached over HTTP (Cloudinary-style API) and a local
//! filesystem backend for development.
//!
//! # Public id format
//!
//! Assets are addressed by a provider-assigned public id plus a resource kind.
//! When a folder is requested the id is `{folder}/{name}`; ids must not contain
//! `..` or a leading `/`.

#[cfg(feature = "provider-cloudinary")]
pub mod cloudinary;
pub mod factory;
#[cfg(feature = "provider-local")]
pub mod local;
pub(crate) mod source;
pub mod traits;

// Re-export commonly used types
pub use avatarkit_core::ProviderBackend;
#[cfg(feature = "provider-cloudinary")]
pub use cloudinary::CloudinaryProvider;
pub use factory::create_provider;
#[cfg(feature = "provider-local")]
pub use local::LocalProvider;
pub use traits::{MediaProvider, ProviderAsset, ProviderError, ProviderResult, UploadParams};
