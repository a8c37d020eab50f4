//! HTTP client settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use taleweave_core::config::ApiConfig;

/// Settings for [`ApiClient`](super::ApiClient).
///
/// Usually derived from the `api` section of the client config; the refresh
/// path and headers only change in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,

    /// Whole-request deadline.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Relative path of the credential refresh call.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Sent on every request alongside the bearer credential.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_user_agent() -> String {
    format!("Taleweave/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: default_timeout_ms(),
            refresh_path: default_refresh_path(),
            headers: HashMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl RestConfig {
    /// Starts from the defaults.
    #[must_use]
    pub fn builder() -> RestConfigBuilder {
        RestConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whole-request deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl From<&ApiConfig> for RestConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            timeout_ms: api.timeout_ms,
            ..Self::default()
        }
    }
}

/// Fluent construction of a [`RestConfig`].
#[derive(Debug, Clone)]
pub struct RestConfigBuilder {
    config: RestConfig,
}

impl RestConfigBuilder {
    /// Backend root, e.g. `https://api.taleweave.app/api`.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Whole-request deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Where to send the refresh call after a 401.
    #[must_use]
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.config.refresh_path = path.into();
        self
    }

    /// Extra header sent on every request.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> RestConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RestConfig::builder()
            .base_url("https://api.taleweave.app/api")
            .timeout(Duration::from_secs(15))
            .header("X-Client", "cli")
            .build();

        assert_eq!(config.base_url, "https://api.taleweave.app/api");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.refresh_path, "/auth/refresh");
        assert_eq!(config.headers.get("X-Client").map(String::as_str), Some("cli"));
        assert!(config.user_agent.starts_with("Taleweave/"));
    }

    #[test]
    fn test_url_for_normalises_slashes() {
        let config = RestConfig::builder().base_url("http://h/api/").build();
        assert_eq!(config.url_for("/stories"), "http://h/api/stories");
        assert_eq!(config.url_for("stories/7"), "http://h/api/stories/7");
    }

    #[test]
    fn test_from_api_section() {
        let api = ApiConfig::default();
        let config = RestConfig::from(&api);
        assert_eq!(config.base_url, "http://localhost:3001/api");
        assert_eq!(config.timeout_ms, api.timeout_ms);
        assert_eq!(config.refresh_path, "/auth/refresh");
    }

    #[test]
    fn test_config_defaults() {
        let config = RestConfig::default();
        assert!(config.base_url.is_empty());
        assert_eq!(config.timeout_ms, 30_000);
        assert!(config.headers.is_empty());
    }
}
