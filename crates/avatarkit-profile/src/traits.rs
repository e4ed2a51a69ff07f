//! Seams between the avatar flow and the services it drives.

use async_trait::async_trait;
use avatarkit_api_client::ApiClient;
use avatarkit_core::{TransferProgress, UploadRequest, UploadResult};
use avatarkit_gateway::UploadGateway;

use crate::error::AvatarError;

/// Uploads the chosen image and reports progress.
#[async_trait]
pub trait AvatarUploader: Send + Sync {
    async fn upload_avatar(
        &self,
        request: UploadRequest,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> UploadResult;
}

/// Records the hosted URL as the user's profile picture.
#[async_trait]
pub trait ProfileUpdater: Send + Sync {
    async fn update_profile_picture(&self, url: &str) -> Result<(), AvatarError>;
}

#[async_trait]
impl AvatarUploader for UploadGateway {
    async fn upload_avatar(
        &self,
        request: UploadRequest,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> UploadResult {
        self.upload_with_progress(request, progress).await
    }
}

#[async_trait]
impl ProfileUpdater for ApiClient {
    async fn update_profile_picture(&self, url: &str) -> Result<(), AvatarError> {
        self.update_profile(url)
            .await
            .map(|_| ())
            .map_err(|e| AvatarError::ProfileUpdate(e.to_string()))
    }
}
