#[cfg(feature = "provider-cloudinary")]
use crate::CloudinaryProvider;
#[cfg(feature = "provider-local")]
use crate::LocalProvider;
use crate::{MediaProvider, ProviderBackend, ProviderError, ProviderResult};
use avatarkit_core::Config;
use std::sync::Arc;

/// Create a media provider based on configuration
pub async fn create_provider(config: &Config) -> ProviderResult<Arc<dyn MediaProvider>> {
    let settings = &config.provider;

    match settings.backend {
        #[cfg(feature = "provider-cloudinary")]
        ProviderBackend::Cloudinary => {
            let cloud_name = settings.cloud_name.clone().ok_or_else(|| {
                ProviderError::ConfigError("CLOUDINARY_CLOUD_NAME not configured".to_string())
            })?;
            let api_key = settings.api_key.clone().ok_or_else(|| {
                ProviderError::ConfigError("CLOUDINARY_API_KEY not configured".to_string())
            })?;
            let api_secret = settings.api_secret.clone().ok_or_else(|| {
                ProviderError::ConfigError("CLOUDINARY_API_SECRET not configured".to_string())
            })?;

            let provider =
                CloudinaryProvider::new(cloud_name, api_key, api_secret, settings.api_url.clone())?;
            Ok(Arc::new(provider))
        }

        #[cfg(not(feature = "provider-cloudinary"))]
        ProviderBackend::Cloudinary => Err(ProviderError::ConfigError(
            "Cloudinary provider not available (provider-cloudinary feature not enabled)"
                .to_string(),
        )),

        #[cfg(feature = "provider-local")]
        ProviderBackend::Local => {
            let base_path = settings.local_path.clone().ok_or_else(|| {
                ProviderError::ConfigError("LOCAL_MEDIA_PATH not configured".to_string())
            })?;
            let base_url = settings.local_base_url.clone().ok_or_else(|| {
                ProviderError::ConfigError("LOCAL_MEDIA_BASE_URL not configured".to_string())
            })?;

            let provider = LocalProvider::new(base_path, base_url).await?;
            Ok(Arc::new(provider))
        }

        #[cfg(not(feature = "provider-local"))]
        ProviderBackend::Local => Err(ProviderError::ConfigError(
            "Local provider not available (provider-local feature not enabled)".to_string(),
        )),
    }
}
