//! Configuration module
//!
//! Provider credentials, upload limits, API client settings and the
//! environment flag, read from the process environment (and `.env`).

use std::env;

use crate::constants::{
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_CHUNK_SIZE_BYTES, DEFAULT_LARGE_FILE_THRESHOLD_MB,
    DEFAULT_MAX_FILE_SIZE_MB, DEV_API_BASE_URL, MB, MIN_PROVIDER_CHUNK_SIZE,
};
use crate::provider_types::ProviderBackend;
use crate::validation::ValidationRules;

const DEFAULT_PROVIDER_API_URL: &str = "https://api.cloudinary.com";
const MIN_JWT_SECRET_LEN: usize = 32;

/// Media provider settings
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub backend: ProviderBackend,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Base URL of the provider API (overridable for testing).
    pub api_url: String,
    pub local_path: Option<String>,
    pub local_base_url: Option<String>,
}

/// Upload limits and transfer strategy thresholds
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub large_file_threshold_bytes: u64,
    pub chunk_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * MB,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            large_file_threshold_bytes: DEFAULT_LARGE_FILE_THRESHOLD_MB * MB,
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
        }
    }
}

impl UploadConfig {
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            max_size_bytes: self.max_file_size_bytes,
            allowed_types: self.allowed_content_types.clone(),
        }
    }
}

/// API client settings
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub api_base_url: Option<String>,
    /// Where the CLI keeps the session tokens between runs.
    pub session_file: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    /// Token-signing secret. Signing itself happens elsewhere; only presence
    /// and strength are checked here.
    pub jwt_secret: Option<String>,
    pub provider: ProviderConfig,
    pub upload: UploadConfig,
    pub client: ClientConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .or_else(|| lookup("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let backend = match lookup("MEDIA_PROVIDER") {
            Some(value) => value.parse::<ProviderBackend>()?,
            None => ProviderBackend::Cloudinary,
        };

        let max_file_size_mb = lookup("MAX_FILE_SIZE_MB")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let large_file_threshold_mb = lookup("LARGE_FILE_THRESHOLD_MB")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LARGE_FILE_THRESHOLD_MB);

        let chunk_size_bytes = lookup("UPLOAD_CHUNK_SIZE")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CHUNK_SIZE_BYTES);

        let allowed_content_types = lookup("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|| DEFAULT_ALLOWED_CONTENT_TYPES.join(","))
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            environment,
            jwt_secret: lookup("JWT_SECRET"),
            provider: ProviderConfig {
                backend,
                cloud_name: lookup("CLOUDINARY_CLOUD_NAME"),
                api_key: lookup("CLOUDINARY_API_KEY"),
                api_secret: lookup("CLOUDINARY_API_SECRET"),
                api_url: lookup("CLOUDINARY_API_URL")
                    .unwrap_or_else(|| DEFAULT_PROVIDER_API_URL.to_string()),
                local_path: lookup("LOCAL_MEDIA_PATH"),
                local_base_url: lookup("LOCAL_MEDIA_BASE_URL"),
            },
            upload: UploadConfig {
                max_file_size_bytes: max_file_size_mb * MB,
                allowed_content_types,
                large_file_threshold_bytes: large_file_threshold_mb * MB,
                chunk_size_bytes,
            },
            client: ClientConfig {
                api_base_url: lookup("API_BASE_URL"),
                session_file: lookup("SESSION_FILE"),
            },
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Whether auth cookies must carry the `Secure` flag (everywhere but development).
    pub fn secure_cookies(&self) -> bool {
        !self.environment.eq_ignore_ascii_case("development")
    }

    pub fn validation_rules(&self) -> ValidationRules {
        self.upload.validation_rules()
    }

    /// API base URL, falling back to the local development server.
    pub fn api_base_url(&self) -> &str {
        self.client
            .api_base_url
            .as_deref()
            .unwrap_or(DEV_API_BASE_URL)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.provider.backend {
            ProviderBackend::Cloudinary => {
                if self.provider.cloud_name.is_none()
                    || self.provider.api_key.is_none()
                    || self.provider.api_secret.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "MEDIA_PROVIDER=cloudinary requires CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET"
                    ));
                }
                if self.upload.chunk_size_bytes < MIN_PROVIDER_CHUNK_SIZE {
                    return Err(anyhow::anyhow!(
                        "UPLOAD_CHUNK_SIZE must be at least {} bytes",
                        MIN_PROVIDER_CHUNK_SIZE
                    ));
                }
            }
            ProviderBackend::Local => {
                if self.provider.local_path.is_none() || self.provider.local_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "MEDIA_PROVIDER=local requires LOCAL_MEDIA_PATH and LOCAL_MEDIA_BASE_URL"
                    ));
                }
            }
        }

        if self.upload.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }

        if self.upload.chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CHUNK_SIZE must be greater than zero"));
        }

        if self.is_production() {
            match self.jwt_secret {
                Some(ref secret) if secret.len() >= MIN_JWT_SECRET_LEN => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "JWT_SECRET must be at least {} characters long in production",
                        MIN_JWT_SECRET_LEN
                    ))
                }
            }
            if self.client.api_base_url.is_none() {
                return Err(anyhow::anyhow!("API_BASE_URL must be set in production"));
            }
        }

        Ok(())
    }
}
