//! Avatar flow against fake collaborators, plus one run through the real
//! gateway (local provider) and API client (mock server).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use avatarkit_api_client::{ApiClient, MemorySessionStore};
use avatarkit_core::constants::MB;
use avatarkit_core::{
    FailureKind, ResourceKind, TransferProgress, UploadRequest, UploadResult,
};
use avatarkit_gateway::{GatewaySettings, UploadGateway};
use avatarkit_profile::{
    AvatarError, AvatarFile, AvatarState, AvatarUploadFlow, AvatarUploader, ProfileUpdater,
};
use avatarkit_provider::LocalProvider;
use tokio::sync::watch;

const HOSTED_URL: &str = "https://res.example.com/profile_pictures/abc.jpg";

struct FakeUploader {
    result: UploadResult,
    requests: Mutex<Vec<UploadRequest>>,
    progress_rx: Mutex<Option<watch::Receiver<f64>>>,
    observed_progress: Mutex<Vec<f64>>,
}

impl FakeUploader {
    fn new(result: UploadResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            requests: Mutex::new(Vec::new()),
            progress_rx: Mutex::new(None),
            observed_progress: Mutex::new(Vec::new()),
        })
    }

    fn succeeding() -> Arc<Self> {
        Self::new(UploadResult::Success {
            url: HOSTED_URL.to_string(),
            public_id: "profile_pictures/abc".to_string(),
            resource_type: ResourceKind::Image,
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AvatarUploader for FakeUploader {
    async fn upload_avatar(
        &self,
        request: UploadRequest,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> UploadResult {
        self.requests.lock().unwrap().push(request);
        progress(TransferProgress::new(50, 100));
        if let Some(rx) = self.progress_rx.lock().unwrap().as_ref() {
            self.observed_progress.lock().unwrap().push(*rx.borrow());
        }
        self.result.clone()
    }
}

#[derive(Default)]
struct FakeProfile {
    fail: bool,
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl ProfileUpdater for FakeProfile {
    async fn update_profile_picture(&self, url: &str) -> Result<(), AvatarError> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(AvatarError::ProfileUpdate("status 500".to_string()));
        }
        Ok(())
    }
}

fn jpeg(len: usize) -> AvatarFile {
    AvatarFile::new(vec![0xAB; len], "me.jpg", "image/jpeg")
}

#[tokio::test]
async fn disallowed_type_is_rejected_before_preview_or_upload() {
    let uploader = FakeUploader::succeeding();
    let profile = Arc::new(FakeProfile::default());
    let flow = AvatarUploadFlow::new(uploader.clone(), profile.clone());
    let mut states = flow.subscribe_state();

    let err = flow
        .select(AvatarFile::new(vec![1u8; 32], "doc.pdf", "application/pdf"))
        .await
        .unwrap_err();

    assert_eq!(err, AvatarError::InvalidType);
    assert_eq!(
        flow.state(),
        AvatarState::Failed {
            error: "Please upload a valid image (JPEG, PNG, JPG, GIF, or WEBP)".to_string()
        }
    );
    assert!(flow.state().preview().is_none());
    assert!(states.has_changed().unwrap());
    assert!(states.borrow_and_update().preview().is_none());
    assert_eq!(uploader.calls(), 0);
    assert!(profile.urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_image_is_rejected() {
    let uploader = FakeUploader::succeeding();
    let flow = AvatarUploadFlow::new(uploader.clone(), Arc::new(FakeProfile::default()));

    let err = flow.select(jpeg((10 * MB + 1) as usize)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Image exceeds 10MB limit. Please choose a smaller file."
    );
    assert_eq!(uploader.calls(), 0);
}

#[tokio::test]
async fn successful_upload_updates_profile_and_resets_progress() {
    let uploader = FakeUploader::succeeding();
    let profile = Arc::new(FakeProfile::default());
    let flow = AvatarUploadFlow::new(uploader.clone(), profile.clone());
    *uploader.progress_rx.lock().unwrap() = Some(flow.subscribe_progress());
    let progress = flow.subscribe_progress();

    let outcome = flow.select(jpeg(2048)).await.unwrap();

    assert_eq!(outcome.url, HOSTED_URL);
    assert!(outcome.preview.starts_with("data:image/jpeg;base64,"));
    assert_eq!(*profile.urls.lock().unwrap(), vec![HOSTED_URL.to_string()]);
    assert_eq!(*uploader.observed_progress.lock().unwrap(), vec![0.5]);
    assert_eq!(*progress.borrow(), 0.0);
    assert_eq!(
        flow.state(),
        AvatarState::Succeeded {
            url: HOSTED_URL.to_string(),
            preview: Some(outcome.preview.clone()),
        }
    );

    let requests = uploader.requests.lock().unwrap();
    let options = &requests[0].options;
    assert_eq!(options.folder.as_deref(), Some("profile_pictures"));
    let chain = options.transformation.as_ref().unwrap();
    assert_eq!(chain[0].width, Some(500));
    assert_eq!(chain[0].height, Some(500));
    assert_eq!(chain[0].crop.as_deref(), Some("fill"));
    assert_eq!(chain[0].gravity.as_deref(), Some("face"));
}

#[tokio::test]
async fn upload_failure_discards_preview_and_skips_profile() {
    let uploader = FakeUploader::new(UploadResult::Failure {
        error: "Image too large for the media provider".to_string(),
        kind: FailureKind::PayloadTooLarge,
        suggestion: None,
        status_code: Some(413),
    });
    let profile = Arc::new(FakeProfile::default());
    let flow = AvatarUploadFlow::new(uploader, profile.clone());
    let progress = flow.subscribe_progress();

    let err = flow.select(jpeg(1024)).await.unwrap_err();

    assert_eq!(
        err,
        AvatarError::Upload("Image too large for the media provider".to_string())
    );
    assert!(flow.state().preview().is_none());
    assert_eq!(
        flow.state().error(),
        Some("Image too large for the media provider")
    );
    assert_eq!(*progress.borrow(), 0.0);
    assert!(profile.urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_failure_message_falls_back() {
    let uploader = FakeUploader::new(UploadResult::failure(FailureKind::Provider, ""));
    let flow = AvatarUploadFlow::new(uploader, Arc::new(FakeProfile::default()));
    let err = flow.select(jpeg(10)).await.unwrap_err();
    assert_eq!(err.to_string(), "Upload failed");
}

#[tokio::test]
async fn profile_update_failure_is_surfaced() {
    let profile = Arc::new(FakeProfile {
        fail: true,
        ..FakeProfile::default()
    });
    let flow = AvatarUploadFlow::new(FakeUploader::succeeding(), profile);

    let err = flow.select(jpeg(10)).await.unwrap_err();
    assert!(matches!(err, AvatarError::ProfileUpdate(_)));
    assert!(flow.state().preview().is_none());
}

#[tokio::test]
async fn remove_image_and_reset() {
    let flow = AvatarUploadFlow::new(
        FakeUploader::succeeding(),
        Arc::new(FakeProfile::default()),
    );

    flow.select(jpeg(10)).await.unwrap();
    flow.remove_image();
    assert_eq!(
        flow.state(),
        AvatarState::Succeeded {
            url: HOSTED_URL.to_string(),
            preview: None
        }
    );
    flow.reset();
    assert_eq!(flow.state(), AvatarState::Idle);

    flow.select(AvatarFile::new(vec![1u8], "a.txt", "text/plain"))
        .await
        .unwrap_err();
    flow.remove_image();
    assert_eq!(flow.state(), AvatarState::Idle);
}

#[tokio::test]
async fn end_to_end_with_local_provider_and_api() {
    let dir = tempfile::tempdir().unwrap();
    let provider = LocalProvider::new(dir.path(), "http://localhost:5001/media".to_string())
        .await
        .unwrap();
    let gateway = UploadGateway::new(Arc::new(provider), GatewaySettings::default());

    let mut server = mockito::Server::new_async().await;
    let update = server
        .mock("PUT", "/auth/update-profile")
        .match_header("authorization", "Bearer token-1")
        .match_body(mockito::Matcher::Regex(
            r#""profilePic":"http://localhost:5001/media/image/profile_pictures/"#.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(&server.url(), Arc::new(MemorySessionStore::new())).unwrap();
    client.login_with("token-1", "refresh-1").unwrap();

    let flow = AvatarUploadFlow::new(Arc::new(gateway), Arc::new(client));
    let file = AvatarFile::new(vec![0x89u8; 4096], "me.png", "image/png");
    let outcome = flow.select(file).await.unwrap();

    assert!(outcome
        .url
        .starts_with("http://localhost:5001/media/image/profile_pictures/"));
    update.assert_async().await;
}

#[tokio::test]
async fn jpg_alias_passes_through_real_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let provider = LocalProvider::new(dir.path(), "http://localhost:5001/media".to_string())
        .await
        .unwrap();
    let gateway = UploadGateway::new(Arc::new(provider), GatewaySettings::default());

    let mut server = mockito::Server::new_async().await;
    let update = server
        .mock("PUT", "/auth/update-profile")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(&server.url(), Arc::new(MemorySessionStore::new())).unwrap();
    client.login_with("token-1", "refresh-1").unwrap();

    let flow = AvatarUploadFlow::new(Arc::new(gateway), Arc::new(client));
    let outcome = flow
        .select(AvatarFile::new(vec![0xFFu8; 2048], "me.jpg", "image/jpg"))
        .await
        .unwrap();

    assert!(outcome.preview.starts_with("data:image/jpg;base64,"));
    assert!(outcome
        .url
        .starts_with("http://localhost:5001/media/image/profile_pictures/"));
    update.assert_async().await;
}
