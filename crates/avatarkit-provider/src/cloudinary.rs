//! Hosted media provider reached over the Cloudinary upload API.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use avatarkit_core::{
    ProviderBackend, ResourceKind, TransferProgress, Transformation, UploadSource,
};
use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::source::{read_all, ChunkReader};
use crate::traits::{MediaProvider, ProviderAsset, ProviderError, ProviderResult, UploadParams};

const HTTP_TIMEOUT_SECS: u64 = 120;

/// Cloudinary-backed media provider
#[derive(Clone)]
pub struct CloudinaryProvider {
    http_client: reqwest::Client,
    api_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl Debug for CloudinaryProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryProvider")
            .field("api_url", &self.api_url)
            .field("cloud_name", &self.cloud_name)
            .finish()
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(serde::Deserialize)]
struct DestroyBody {
    result: String,
}

impl CloudinaryProvider {
    /// Create a new provider client
    ///
    /// # Arguments
    /// * `cloud_name` - Account (cloud) name
    /// * `api_key` / `api_secret` - Credentials used to sign requests
    /// * `api_url` - API base URL, e.g. "https://api.cloudinary.com"
    pub fn new(
        cloud_name: String,
        api_key: String,
        api_secret: String,
        api_url: String,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ProviderError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
        })
    }

    fn endpoint(&self, kind: ResourceKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_url, self.cloud_name, kind, action
        )
    }

    /// SHA-256 request signature: non-empty params sorted by key, joined as
    /// `k=v&k=v`, followed by the API secret.
    pub(crate) fn signature(&self, params: &BTreeMap<String, String>) -> String {
        let to_sign = params
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn signed(&self, mut params: BTreeMap<String, String>) -> BTreeMap<String, String> {
        params.insert("timestamp".to_string(), Utc::now().timestamp().to_string());
        let signature = self.signature(&params);
        params.insert("api_key".to_string(), self.api_key.clone());
        params.insert("signature".to_string(), signature);
        params.insert("signature_algorithm".to_string(), "sha256".to_string());
        params
    }

    /// Upload parameters derived from merged options. Top-level quality and
    /// format are appended to the incoming transformation chain.
    fn upload_fields(params: &UploadParams) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let options = &params.options;

        if let Some(ref folder) = options.folder {
            fields.insert("folder".to_string(), folder.clone());
        }

        let mut chain = options.transformation.clone().unwrap_or_default();
        if options.quality.is_some() || options.fetch_format.is_some() {
            chain.push(Transformation {
                quality: options.quality.clone(),
                fetch_format: options.fetch_format.clone(),
                ..Default::default()
            });
        }
        let transformation = Transformation::chain_param(&chain);
        if !transformation.is_empty() {
            fields.insert("transformation".to_string(), transformation);
        }

        fields
    }

    fn form(
        fields: &BTreeMap<String, String>,
        content: Bytes,
        params: &UploadParams,
    ) -> ProviderResult<Form> {
        let part = Part::bytes(content.to_vec())
            .file_name(params.file_name.clone())
            .mime_str(&params.content_type)
            .map_err(|e| ProviderError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = fields
            .iter()
            .fold(Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()));
        Ok(form.part("file", part))
    }

    fn error_from_response(status: StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.to_string());

        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return ProviderError::PayloadTooLarge(message);
        }

        ProviderError::Http {
            status: status.as_u16(),
            message,
        }
    }

    async fn read_body(response: reqwest::Response) -> ProviderResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::error_from_response(status, &body));
        }
        Ok(body)
    }

    fn parse_asset(body: &str) -> ProviderResult<ProviderAsset> {
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport(format!("Failed to send request to media provider: {}", e))
}

#[async_trait]
impl MediaProvider for CloudinaryProvider {
    async fn upload(
        &self,
        source: &UploadSource,
        params: &UploadParams,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> ProviderResult<ProviderAsset> {
        let url = self.endpoint(params.resource_kind(), "upload");
        let content = read_all(source).await?;
        let total = content.len() as u64;
        let fields = self.signed(Self::upload_fields(params));
        let form = Self::form(&fields, content, params)?;

        let start = std::time::Instant::now();
        progress(TransferProgress::new(0, total));

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let body = Self::read_body(response).await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Media provider upload failed");
            e
        })?;
        let asset = Self::parse_asset(&body)?;

        progress(TransferProgress::new(total, total));

        tracing::info!(
            public_id = %asset.public_id,
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media provider upload successful"
        );

        Ok(asset)
    }

    async fn upload_chunked(
        &self,
        source: &UploadSource,
        params: &UploadParams,
        chunk_size: u64,
        progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> ProviderResult<ProviderAsset> {
        if chunk_size == 0 {
            return Err(ProviderError::ConfigError(
                "Chunk size must be greater than zero".to_string(),
            ));
        }

        let url = self.endpoint(params.resource_kind(), "upload");
        let upload_id = Uuid::new_v4().simple().to_string();
        let fields = self.signed(Self::upload_fields(params));
        let total = params.total_bytes;
        let start = std::time::Instant::now();

        let mut reader = ChunkReader::open(source).await?;
        let mut offset: u64 = 0;
        let mut chunks = 0usize;
        let mut last_body = None;

        progress(TransferProgress::new(0, total));

        while let Some(chunk) = reader.next_chunk(chunk_size as usize).await? {
            let end = offset + chunk.len() as u64 - 1;
            let form = Self::form(&fields, chunk, params)?;

            let response = self
                .http_client
                .post(&url)
                .header("X-Unique-Upload-Id", &upload_id)
                .header("Content-Range", format!("bytes {}-{}/{}", offset, end, total))
                .multipart(form)
                .send()
                .await
                .map_err(transport)?;

            let body = Self::read_body(response).await.map_err(|e| {
                tracing::error!(
                    error = %e,
                    upload_id = %upload_id,
                    chunk_start = offset,
                    "Media provider chunk upload failed"
                );
                e
            })?;

            offset = end + 1;
            chunks += 1;
            progress(TransferProgress::new(offset, total));
            tracing::debug!(upload_id = %upload_id, uploaded = offset, total = total, "Chunk accepted");
            last_body = Some(body);
        }

        let body = last_body
            .ok_or_else(|| ProviderError::UploadFailed("No content to upload".to_string()))?;
        let asset = Self::parse_asset(&body)?;

        tracing::info!(
            public_id = %asset.public_id,
            size_bytes = offset,
            chunks = chunks,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media provider chunked upload successful"
        );

        Ok(asset)
    }

    async fn destroy(&self, public_id: &str, resource_kind: ResourceKind) -> ProviderResult<()> {
        // destroy needs a concrete kind; images are the default
        let kind = match resource_kind {
            ResourceKind::Auto => ResourceKind::Image,
            other => other,
        };
        let url = self.endpoint(kind, "destroy");

        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), public_id.to_string());
        let fields = self.signed(params);

        let response = self
            .http_client
            .post(&url)
            .form(&fields)
            .send()
            .await
            .map_err(transport)?;

        let body = Self::read_body(response).await?;
        let result: DestroyBody = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        match result.result.as_str() {
            "ok" => {
                tracing::info!(
                    public_id = %public_id,
                    resource_type = %kind,
                    "Media provider delete successful"
                );
                Ok(())
            }
            "not found" => Err(ProviderError::NotFound(public_id.to_string())),
            other => Err(ProviderError::DeleteFailed(format!(
                "Unexpected delete result for {}: {}",
                public_id, other
            ))),
        }
    }

    fn backend_type(&self) -> ProviderBackend {
        ProviderBackend::Cloudinary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatarkit_core::UploadOptions;
    use mockito::Matcher;
    use std::sync::Mutex;

    fn provider(url: &str) -> CloudinaryProvider {
        CloudinaryProvider::new(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
            url.to_string(),
        )
        .unwrap()
    }

    fn params(options: UploadOptions, total_bytes: u64) -> UploadParams {
        UploadParams {
            options,
            content_type: "image/jpeg".to_string(),
            file_name: "me.jpg".to_string(),
            total_bytes,
        }
    }

    fn buffer(len: usize) -> UploadSource {
        UploadSource::Buffer {
            data: Bytes::from(vec![1u8; len]),
            original_name: "me.jpg".to_string(),
        }
    }

    const ASSET_BODY: &str = r#"{
        "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/profile_pictures/abc.jpg",
        "public_id": "profile_pictures/abc",
        "resource_type": "image",
        "bytes": 10,
        "format": "jpg"
    }"#;

    #[test]
    fn signature_is_sorted_sha256_with_secret() {
        let p = provider("http://localhost");
        let mut params = BTreeMap::new();
        params.insert("timestamp".to_string(), "1315060510".to_string());
        params.insert("public_id".to_string(), "sample".to_string());
        params.insert("folder".to_string(), String::new());

        let mut hasher = Sha256::new();
        hasher.update(b"public_id=sample&timestamp=1315060510secret");
        assert_eq!(p.signature(&params), hex::encode(hasher.finalize()));
    }

    #[test]
    fn upload_fields_fold_quality_into_transformation() {
        let options = UploadOptions::gateway_defaults().with_folder("avatars");
        let fields = CloudinaryProvider::upload_fields(&params(options, 1));
        assert_eq!(fields.get("folder").map(String::as_str), Some("avatars"));
        assert_eq!(
            fields.get("transformation").map(String::as_str),
            Some("w_1920,c_limit/q_auto:good/q_auto,f_auto")
        );
    }

    #[tokio::test]
    async fn upload_returns_asset() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1_1/demo/image/upload")
            .match_body(Matcher::Regex("name=\"signature\"".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ASSET_BODY)
            .expect(1)
            .create_async()
            .await;

        let seen = Mutex::new(Vec::new());
        let options = UploadOptions::default().with_resource_type(ResourceKind::Image);
        let asset = provider(&server.url())
            .upload(&buffer(10), &params(options, 10), &|p| {
                seen.lock().unwrap().push(p)
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(asset.public_id, "profile_pictures/abc");
        assert_eq!(asset.resource_type, ResourceKind::Image);
        assert_eq!(
            seen.lock().unwrap().last().copied(),
            Some(TransferProgress::new(10, 10))
        );
    }

    #[tokio::test]
    async fn status_413_maps_to_payload_too_large() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/auto/upload")
            .with_status(413)
            .with_body(r#"{"error":{"message":"File size too large"}}"#)
            .create_async()
            .await;

        let err = provider(&server.url())
            .upload(&buffer(10), &params(UploadOptions::default(), 10), &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::PayloadTooLarge(ref m) if m == "File size too large"));
    }

    #[tokio::test]
    async fn other_status_maps_to_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/auto/upload")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid Signature"}}"#)
            .create_async()
            .await;

        let err = provider(&server.url())
            .upload(&buffer(10), &params(UploadOptions::default(), 10), &|_| {})
            .await
            .unwrap_err();
        match err {
            ProviderError::Http { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn chunked_upload_sends_content_ranges() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/v1_1/demo/auto/upload")
            .match_header("content-range", "bytes 0-3/10")
            .match_header("x-unique-upload-id", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"done":false}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/v1_1/demo/auto/upload")
            .match_header("content-range", "bytes 4-7/10")
            .with_status(200)
            .with_body(r#"{"done":false}"#)
            .expect(1)
            .create_async()
            .await;
        let last = server
            .mock("POST", "/v1_1/demo/auto/upload")
            .match_header("content-range", "bytes 8-9/10")
            .with_status(200)
            .with_body(ASSET_BODY)
            .expect(1)
            .create_async()
            .await;

        let seen = Mutex::new(Vec::new());
        let asset = provider(&server.url())
            .upload_chunked(&buffer(10), &params(UploadOptions::default(), 10), 4, &|p| {
                seen.lock().unwrap().push(p.loaded)
            })
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        last.assert_async().await;
        assert_eq!(asset.public_id, "profile_pictures/abc");
        assert_eq!(*seen.lock().unwrap(), vec![0, 4, 8, 10]);
    }

    #[tokio::test]
    async fn destroy_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/image/destroy")
            .match_body(Matcher::Regex("public_id=gone".to_string()))
            .with_status(200)
            .with_body(r#"{"result":"not found"}"#)
            .create_async()
            .await;

        let err = provider(&server.url())
            .destroy("gone", ResourceKind::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(ref id) if id == "gone"));
    }

    #[tokio::test]
    async fn destroy_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1_1/demo/video/destroy")
            .with_status(200)
            .with_body(r#"{"result":"ok"}"#)
            .expect(1)
            .create_async()
            .await;

        provider(&server.url())
            .destroy("clip", ResourceKind::Video)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_provider_is_transport_error() {
        let err = provider("http://127.0.0.1:1")
            .destroy("x", ResourceKind::Image)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
