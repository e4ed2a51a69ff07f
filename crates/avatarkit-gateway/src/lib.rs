//! Media upload gateway
//!
//! Validates an incoming file, merges caller options over the defaults,
//! picks a transfer strategy and forwards the file to the configured media
//! provider. Every outcome, including validation and provider failures, comes
//! back as an [`UploadResult`](avatarkit_core::UploadResult); nothing is
//! thrown past this boundary.

mod filename;
mod service;
mod strategy;

pub use filename::sanitize_filename;
pub use service::{GatewaySettings, UploadGateway};
pub use strategy::TransferStrategy;
