//! Authenticated API client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use avatarkit_core::constants::{
    ACCESS_TOKEN_KEY, REFRESH_PATH, REFRESH_TOKEN_KEY, REQUEST_TIMEOUT_SECS, UPDATE_PROFILE_PATH,
};
use avatarkit_core::Config;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ErrorCategory};
use crate::observer::{LoggingObserver, SessionObserver};
use crate::request::{RequestAttempt, RequestSpec};
use crate::session::{AuthSession, FileSessionStore, MemorySessionStore, SessionStore};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    profile_pic: &'a str,
}

/// HTTP client for the avatarkit API.
///
/// Every request carries the stored access token. A 401 triggers one token
/// refresh and one replay of the request; anything else is reported as is.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    observer: Arc<dyn SessionObserver>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            observer: Arc::new(LoggingObserver),
        })
    }

    /// Replace the default logging observer.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Client for the configured API. Tokens are kept in `SESSION_FILE` when
    /// set, otherwise in memory.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        if config.is_production() && config.client.api_base_url.is_none() {
            return Err(ClientError::Config(
                "API_BASE_URL must be set in production".to_string(),
            ));
        }

        let session: Arc<dyn SessionStore> = match config.client.session_file.as_deref() {
            Some(path) => Arc::new(FileSessionStore::open(path)?),
            None => Arc::new(MemorySessionStore::new()),
        };

        Self::new(config.api_base_url(), session)
    }

    /// Create client from environment (`.env` is honored): API_BASE_URL, SESSION_FILE.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config::from_env().context("Failed to load configuration")?;
        Self::from_config(&config).context("Failed to create API client")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn session(&self) -> AuthSession {
        AuthSession::load(self.session.as_ref())
    }

    /// Store the tokens issued at login.
    pub fn login_with(&self, access_token: &str, refresh_token: &str) -> Result<(), ClientError> {
        self.session.set(ACCESS_TOKEN_KEY, access_token)?;
        self.session.set(REFRESH_TOKEN_KEY, refresh_token)?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(RequestSpec::new(Method::GET, path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        self.send(RequestSpec::new(Method::POST, path).with_body(body))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        self.send(RequestSpec::new(Method::PUT, path).with_body(body))
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        self.send(RequestSpec::new(Method::PATCH, path).with_body(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(RequestSpec::new(Method::DELETE, path)).await
    }

    /// Point the signed-in user's profile picture at `profile_pic_url`.
    pub async fn update_profile(&self, profile_pic_url: &str) -> Result<Value, ClientError> {
        self.put(
            UPDATE_PROFILE_PATH,
            &UpdateProfileRequest {
                profile_pic: profile_pic_url,
            },
        )
        .await
    }

    /// Send a request and decode its JSON body. An empty body decodes as `null`.
    pub async fn send<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, ClientError> {
        let text = self.dispatch(spec).await?;
        let body = if text.trim().is_empty() {
            serde_json::from_str("null")?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(body)
    }

    async fn dispatch(&self, spec: RequestSpec) -> Result<String, ClientError> {
        let mut attempt = RequestAttempt::new(spec);
        // set once a refresh succeeds; the replay carries exactly that token
        let mut refreshed_token: Option<String> = None;

        loop {
            let response = self
                .send_once(&attempt, refreshed_token.as_deref())
                .await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            let path = attempt.request().path.clone();

            if status == StatusCode::UNAUTHORIZED {
                match attempt.retry() {
                    Some(replay) => {
                        tracing::debug!(path = %path, "Access token rejected, refreshing");
                        refreshed_token = Some(self.refresh_access_token().await?);
                        attempt = replay;
                        continue;
                    }
                    None => {
                        tracing::warn!(path = %path, "Request unauthorized after token refresh");
                        return Err(ClientError::Unauthorized { path });
                    }
                }
            }

            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let category = ErrorCategory::from_status(status.as_u16());
            self.observer
                .request_failed(category, status.as_u16(), &path);

            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
    }

    /// Send one attempt. `credential` overrides the stored access token.
    async fn send_once(
        &self,
        attempt: &RequestAttempt,
        credential: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let spec = attempt.request();
        let mut request = self
            .client
            .request(spec.method.clone(), self.build_url(&spec.path))
            .header(CONTENT_TYPE, "application/json");

        let token = match credential {
            Some(token) => Some(token.to_string()),
            None => self.session.get(ACCESS_TOKEN_KEY),
        };
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Exchange the refresh token for a new access token and store it.
    ///
    /// Any failure clears the whole session and notifies the observer.
    async fn refresh_access_token(&self) -> Result<String, ClientError> {
        match self.request_new_access_token().await {
            Ok(token) => {
                self.session.set(ACCESS_TOKEN_KEY, &token)?;
                tracing::info!("Access token refreshed");
                Ok(token)
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "Token refresh failed, clearing session");
                if let Err(e) = self.session.clear() {
                    tracing::error!(error = %e, "Failed to clear session");
                }
                self.observer.session_expired();
                Err(ClientError::SessionExpired(reason))
            }
        }
    }

    async fn request_new_access_token(&self) -> Result<String, String> {
        let refresh_token = self
            .session
            .get(REFRESH_TOKEN_KEY)
            .ok_or_else(|| "no refresh token".to_string())?;

        let response = self
            .client
            .post(self.build_url(REFRESH_PATH))
            .header(CONTENT_TYPE, "application/json")
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(|e| format!("refresh request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("refresh rejected with status {}", status.as_u16()));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| format!("malformed refresh response: {}", e))?;

        Ok(body.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn development_defaults_to_local_api() {
        let client = ApiClient::from_config(&config_from(&[])).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5001/api");
        assert_eq!(
            client.build_url("/auth/refresh"),
            "http://localhost:5001/api/auth/refresh"
        );
    }

    #[test]
    fn production_requires_base_url() {
        let err = ApiClient::from_config(&config_from(&[("ENVIRONMENT", "production")]))
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let client = ApiClient::from_config(&config_from(&[
            ("ENVIRONMENT", "production"),
            ("API_BASE_URL", "https://api.example.com/api/"),
        ]))
        .unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/api");
    }

    #[test]
    fn login_and_logout_manage_session() {
        let client = ApiClient::new("http://localhost", Arc::new(MemorySessionStore::new())).unwrap();
        client.login_with("a1", "r1").unwrap();
        assert_eq!(client.session().access_token.as_deref(), Some("a1"));
        client.logout().unwrap();
        assert_eq!(client.session(), AuthSession::default());
    }
}
