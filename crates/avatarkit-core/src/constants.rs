//! Application-wide constants.

/// Bytes in one megabyte (binary).
pub const MB: u64 = 1024 * 1024;

/// Default upload ceiling in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;

/// Uploads at or above this size use chunked transfer.
pub const DEFAULT_LARGE_FILE_THRESHOLD_MB: u64 = 10;

/// Chunk size for chunked transfers (provider request-body limit friendly).
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 6_000_000;

/// Smallest chunk the hosted provider accepts for chunked uploads.
pub const MIN_PROVIDER_CHUNK_SIZE: u64 = 5 * MB;

/// Content types accepted by the upload gateway unless configured otherwise.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Longest edge applied by the default `limit` transformation.
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// Fixed timeout for every API client request.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Token refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Profile update endpoint, relative to the API base URL.
pub const UPDATE_PROFILE_PATH: &str = "/auth/update-profile";

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "authToken";

/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// API base URL used in development when none is configured.
pub const DEV_API_BASE_URL: &str = "http://localhost:5001/api";
