//! Avatar upload state machine.
//!
//! `Idle -> Validating -> Uploading -> Succeeded | Failed`, back to `Idle`
//! through [`AvatarUploadFlow::reset`]. State and progress are published on
//! watch channels so a front end can render them while `select` runs.

use std::sync::Arc;

use avatarkit_core::{TransferProgress, UploadResult};
use tokio::sync::watch;

use crate::error::AvatarError;
use crate::file::{avatar_upload_options, validate_avatar, AvatarFile};
use crate::traits::{AvatarUploader, ProfileUpdater};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarState {
    Idle,
    Validating,
    Uploading { preview: String },
    /// `preview` is dropped by [`AvatarUploadFlow::remove_image`].
    Succeeded { url: String, preview: Option<String> },
    Failed { error: String },
}

impl AvatarState {
    pub fn is_busy(&self) -> bool {
        matches!(self, AvatarState::Validating | AvatarState::Uploading { .. })
    }

    pub fn preview(&self) -> Option<&str> {
        match self {
            AvatarState::Uploading { preview } => Some(preview),
            AvatarState::Succeeded { preview, .. } => preview.as_deref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AvatarState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// A completed avatar change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarOutcome {
    /// Hosted URL now stored on the profile.
    pub url: String,
    pub preview: String,
}

pub struct AvatarUploadFlow {
    uploader: Arc<dyn AvatarUploader>,
    profile: Arc<dyn ProfileUpdater>,
    state: watch::Sender<AvatarState>,
    progress: watch::Sender<f64>,
}

impl AvatarUploadFlow {
    pub fn new(uploader: Arc<dyn AvatarUploader>, profile: Arc<dyn ProfileUpdater>) -> Self {
        let (state, _) = watch::channel(AvatarState::Idle);
        let (progress, _) = watch::channel(0.0);
        Self {
            uploader,
            profile,
            state,
            progress,
        }
    }

    pub fn state(&self) -> AvatarState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<AvatarState> {
        self.state.subscribe()
    }

    /// Upload progress as a fraction in `[0, 1]`; back to 0 after every attempt.
    pub fn subscribe_progress(&self) -> watch::Receiver<f64> {
        self.progress.subscribe()
    }

    /// Validate, preview, upload and record a newly chosen avatar.
    pub async fn select(&self, file: AvatarFile) -> Result<AvatarOutcome, AvatarError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            *state = AvatarState::Validating;
            true
        });
        if !started {
            return Err(AvatarError::Busy);
        }
        self.progress.send_replace(0.0);

        if let Err(err) = validate_avatar(&file) {
            tracing::debug!(file_name = %file.file_name(), error = %err, "Avatar rejected");
            return Err(self.fail(err));
        }

        let preview = file.preview_data_url();
        self.state.send_replace(AvatarState::Uploading {
            preview: preview.clone(),
        });

        let result = self.upload_and_record(file).await;
        self.progress.send_replace(0.0);

        match result {
            Ok(url) => {
                tracing::info!(url = %url, "Profile picture updated");
                self.state.send_replace(AvatarState::Succeeded {
                    url: url.clone(),
                    preview: Some(preview.clone()),
                });
                Ok(AvatarOutcome { url, preview })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Avatar upload failed");
                Err(self.fail(err))
            }
        }
    }

    async fn upload_and_record(&self, file: AvatarFile) -> Result<String, AvatarError> {
        let request = file.into_upload_request(avatar_upload_options());
        let report = |p: TransferProgress| {
            self.progress.send_replace(p.fraction());
        };

        let url = match self.uploader.upload_avatar(request, &report).await {
            UploadResult::Success { url, .. } => url,
            UploadResult::Failure { error, .. } if error.is_empty() => {
                return Err(AvatarError::Upload("Upload failed".to_string()))
            }
            UploadResult::Failure { error, .. } => return Err(AvatarError::Upload(error)),
        };

        self.profile.update_profile_picture(&url).await?;
        Ok(url)
    }

    /// Record the failure; the preview is discarded with the previous state.
    fn fail(&self, err: AvatarError) -> AvatarError {
        self.state.send_replace(AvatarState::Failed {
            error: err.to_string(),
        });
        err
    }

    /// Clear the preview and any error. No effect while an upload is running.
    pub fn remove_image(&self) {
        self.state.send_if_modified(|state| match state {
            AvatarState::Failed { .. } => {
                *state = AvatarState::Idle;
                true
            }
            AvatarState::Succeeded { preview, .. } if preview.is_some() => {
                *preview = None;
                true
            }
            _ => false,
        });
    }

    /// Return to `Idle` unless an upload is running.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_busy() || *state == AvatarState::Idle {
                return false;
            }
            *state = AvatarState::Idle;
            true
        });
    }
}
