//! REST client with bearer credentials and refresh-once-and-replay.

use reqwest::{Client, Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use taleweave_core::error::{ApiError, NetworkError};
use taleweave_telemetry::masking::SensitiveDataMasker;
use taleweave_telemetry::spans::request_span;
use tracing::{Instrument, debug, warn};

use super::config::RestConfig;
use super::hooks::{InFlightGuard, SessionHooks};

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";

/// Backend client that attaches the session credential to every request.
///
/// A `401` on any non-auth endpoint triggers exactly one credential refresh
/// followed by exactly one replay of the original request. A failed refresh
/// ends the session through [`SessionHooks::session_expired`].
///
/// ```ignore
/// use std::sync::Arc;
/// use taleweave_gateway::rest::{ApiClient, MemorySession, RestConfig};
///
/// let config = RestConfig::builder()
///     .base_url("http://localhost:3001/api")
///     .build();
/// let client = ApiClient::new(config, Arc::new(MemorySession::default()))?;
/// let stories: serde_json::Value = client.get("/stories").await?;
/// ```
pub struct ApiClient {
    config: RestConfig,
    http_client: Client,
    hooks: Arc<dyn SessionHooks>,
    masker: SensitiveDataMasker,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish_non_exhaustive()
    }
}

struct RawResponse {
    status: StatusCode,
    retry_after_ms: Option<u64>,
    body: String,
}

impl RawResponse {
    fn into_value(self) -> Result<Value, ApiError> {
        if self.status.is_success() {
            if self.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&self.body).map_err(|e| ApiError::Decode {
                reason: e.to_string(),
            });
        }

        Err(ApiError::from_status(
            self.status.as_u16(),
            error_message(&self.body),
            self.retry_after_ms,
        ))
    }
}

/// Pulls `message` or `error` out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"].iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
}

/// Extracts the new credential from a refresh response.
///
/// Accepts `{token}`, `{accessToken}`, and the same fields nested under `data`.
#[must_use]
pub fn extract_token(value: &Value) -> Option<String> {
    let find = |v: &Value| {
        ["token", "accessToken"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    };
    find(value).or_else(|| value.get("data").and_then(find))
}

impl ApiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the HTTP client cannot be created.
    pub fn new(config: RestConfig, hooks: Arc<dyn SessionHooks>) -> Result<Self, NetworkError> {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| NetworkError::ConnectionFailed {
                    reason: "Invalid user agent".to_string(),
                })?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        for (key, value) in &config.headers {
            headers.insert(
                header::HeaderName::try_from(key.as_str()).map_err(|_| {
                    NetworkError::ConnectionFailed {
                        reason: format!("Invalid header name: {key}"),
                    }
                })?,
                value.parse().map_err(|_| NetworkError::ConnectionFailed {
                    reason: format!("Invalid header value for {key}"),
                })?,
            );
        }

        let http_client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| NetworkError::ConnectionFailed {
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            config,
            http_client,
            hooks,
            masker: SensitiveDataMasker::new(),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Issues a request and decodes the JSON response.
    ///
    /// Empty success bodies decode as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = request_span(&request_id, method.as_str(), path);
        self.request_inner(method, path, body).instrument(span).await
    }

    async fn request_inner(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let _in_flight = InFlightGuard::start(self.hooks.as_ref());
        let credential = self.hooks.credential();

        let result = match self.send(&method, path, body, credential.as_deref()).await {
            Ok(response)
                if response.status == StatusCode::UNAUTHORIZED && !self.is_auth_path(path) =>
            {
                self.refresh_and_replay(&method, path, body).await
            }
            other => other.and_then(RawResponse::into_value),
        };

        if let Err(error) = &result
            && !matches!(error, ApiError::SessionExpired)
        {
            if error.is_connectivity() {
                debug!(%error, "Backend unavailable");
            } else {
                warn!(%error, "Request failed");
            }
            self.hooks.request_failed(method.as_str(), path, error);
        }

        result
    }

    async fn refresh_and_replay(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let token = match self.refresh_credential().await {
            Ok(token) => token,
            Err(error) => {
                warn!(
                    error = %self.masker.mask_string(&error.to_string()),
                    "Credential refresh failed, ending session"
                );
                self.hooks.session_expired();
                return Err(ApiError::SessionExpired);
            }
        };

        self.hooks.credential_refreshed(&token);
        debug!("Credential refreshed, replaying request");

        // The replay's outcome is final; a second 401 is not refreshed again.
        self.send(method, path, body, Some(&token))
            .await?
            .into_value()
    }

    /// Exchanges the refresh cookie for a new credential and reports it through
    /// [`SessionHooks::credential_refreshed`].
    pub async fn refresh(&self) -> Result<String, ApiError> {
        let _in_flight = InFlightGuard::start(self.hooks.as_ref());
        let token = self.refresh_credential().await?;
        self.hooks.credential_refreshed(&token);
        Ok(token)
    }

    async fn refresh_credential(&self) -> Result<String, ApiError> {
        let value = self
            .send(&Method::POST, &self.config.refresh_path, None, None)
            .await?
            .into_value()?;
        extract_token(&value).ok_or_else(|| ApiError::Decode {
            reason: "refresh response carried no token".to_string(),
        })
    }

    fn is_auth_path(&self, path: &str) -> bool {
        let normalize = |p: &str| {
            let p = p.split('?').next().unwrap_or_default().trim_end_matches('/');
            format!("/{}", p.trim_start_matches('/'))
        };
        let path = normalize(path);
        path == LOGIN_PATH || path == SIGNUP_PATH || path == normalize(&self.config.refresh_path)
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        credential: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        let url = self.config.url_for(path);
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.http_client.request(method.clone(), &url);
        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let retry_after_ms = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        let body = response.text().await.map_err(|e| self.transport_error(&e))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Received response");
        Ok(RawResponse {
            status,
            retry_after_ms,
            body,
        })
    }

    fn transport_error(&self, error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            ApiError::Unreachable {
                reason: self.masker.mask_string(&error.to_string()).into_owned(),
            }
        }
    }

    /// GET and decode into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.request(Method::GET, path, None).await?)
    }

    /// POST a JSON body and decode into `T`.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        decode(self.request(Method::POST, path, Some(&body)).await?)
    }

    /// PUT a JSON body and decode into `T`.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        decode(self.request(Method::PUT, path, Some(&body)).await?)
    }

    /// DELETE and decode into `T`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.request(Method::DELETE, path, None).await?)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode {
        reason: format!("request body: {e}"),
    })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        reason: e.to_string(),
    })
}
