//! Client configuration structures.
//!
//! # Example YAML
//!
//! ```yaml
//! api:
//!   base_url: "https://api.taleweave.app/api"
//!   timeout_ms: 15000
//! realtime:
//!   socket_url: "wss://api.taleweave.app/socket"
//!   max_reconnect_attempts: 5
//! logging:
//!   level: debug
//!   format: json
//! storage:
//!   directory: "~/.local/share/taleweave"
//! ```

use super::traits::{Configurable, Validatable};
use super::validation::{EnvOverride, ValidationContext, Validator};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "TALEWEAVE";

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaleweaveConfig {
    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Realtime socket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Local persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Validatable for TaleweaveConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();

        ctx.enter("api");
        self.api.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("realtime");
        self.realtime.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("logging");
        self.logging.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.into_result()
    }
}

impl Configurable for TaleweaveConfig {
    /// `TALEWEAVE_API_URL` and `TALEWEAVE_SOCKET_URL` are the short forms for
    /// the two endpoints; every other field uses `TALEWEAVE_<SECTION>_<FIELD>`.
    fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) -> Result<(), ConfigError> {
        env.apply_string(&format!("{prefix}_API_URL"), &mut self.api.base_url);
        env.apply_string(&format!("{prefix}_SOCKET_URL"), &mut self.realtime.socket_url);
        self.api.apply_overrides(&format!("{prefix}_API"), env)?;
        self.realtime
            .apply_overrides(&format!("{prefix}_REALTIME"), env)?;
        self.logging.apply_overrides(&format!("{prefix}_LOGGING"), env)?;
        self.storage.apply_overrides(&format!("{prefix}_STORAGE"), env);
        Ok(())
    }

    fn env_var_names(prefix: &str) -> Vec<String> {
        let mut names = vec![format!("{prefix}_API_URL"), format!("{prefix}_SOCKET_URL")];
        for field in ["BASE_URL", "TIMEOUT_MS"] {
            names.push(format!("{prefix}_API_{field}"));
        }
        for field in [
            "SOCKET_URL",
            "MAX_RECONNECT_ATTEMPTS",
            "RECONNECT_DELAY_MS",
            "MAX_RECONNECT_DELAY_MS",
            "HEARTBEAT_INTERVAL_MS",
        ] {
            names.push(format!("{prefix}_REALTIME_{field}"));
        }
        for field in ["LEVEL", "FORMAT"] {
            names.push(format!("{prefix}_LOGGING_{field}"));
        }
        names.push(format!("{prefix}_STORAGE_DIRECTORY"));
        names
    }
}

/// REST backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ApiConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .url_with_scheme("base_url", &self.base_url, &["http", "https"])
            .positive("timeout_ms", &self.timeout_ms);
    }

    fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) -> Result<(), ConfigError> {
        env.apply_string(&format!("{prefix}_BASE_URL"), &mut self.base_url);
        env.apply_number(&format!("{prefix}_TIMEOUT_MS"), &mut self.timeout_ms)
    }

    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Realtime socket settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Socket endpoint.
    #[serde(default = "default_socket_url")]
    pub socket_url: String,

    /// Reconnection attempts before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Initial reconnect delay in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Upper bound on the reconnect delay in milliseconds.
    #[serde(default = "default_max_reconnect_delay_ms")]
    pub max_reconnect_delay_ms: u64,

    /// Keep-alive interval in milliseconds.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

fn default_socket_url() -> String {
    "ws://localhost:3001/socket".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    1_000
}

fn default_max_reconnect_delay_ms() -> u64 {
    5_000
}

fn default_heartbeat_interval_ms() -> u64 {
    25_000
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            socket_url: default_socket_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_delay_ms: default_max_reconnect_delay_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

impl RealtimeConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .url_with_scheme("socket_url", &self.socket_url, &["ws", "wss"])
            .in_range(
                "max_reconnect_attempts",
                &self.max_reconnect_attempts,
                &1,
                &50,
            )
            .positive("reconnect_delay_ms", &self.reconnect_delay_ms)
            .custom(
                "max_reconnect_delay_ms",
                || self.max_reconnect_delay_ms >= self.reconnect_delay_ms,
                "Must not be smaller than reconnect_delay_ms",
            )
            .positive("heartbeat_interval_ms", &self.heartbeat_interval_ms);
    }

    fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) -> Result<(), ConfigError> {
        env.apply_string(&format!("{prefix}_SOCKET_URL"), &mut self.socket_url);
        env.apply_number(
            &format!("{prefix}_MAX_RECONNECT_ATTEMPTS"),
            &mut self.max_reconnect_attempts,
        )?;
        env.apply_number(
            &format!("{prefix}_RECONNECT_DELAY_MS"),
            &mut self.reconnect_delay_ms,
        )?;
        env.apply_number(
            &format!("{prefix}_MAX_RECONNECT_DELAY_MS"),
            &mut self.max_reconnect_delay_ms,
        )?;
        env.apply_number(
            &format!("{prefix}_HEARTBEAT_INTERVAL_MS"),
            &mut self.heartbeat_interval_ms,
        )
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (`info`, `debug`, `taleweave_gateway=trace`, ...).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .require_non_empty("level", &self.level)
            .custom(
                "format",
                || matches!(self.format.to_lowercase().as_str(), "pretty" | "json"),
                "Must be 'pretty' or 'json'",
            );
    }

    fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) -> Result<(), ConfigError> {
        env.apply_string(&format!("{prefix}_LEVEL"), &mut self.level);
        env.apply_string(&format!("{prefix}_FORMAT"), &mut self.format);
        Ok(())
    }
}

/// Local persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory for the persisted client blob. No persistence when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl StorageConfig {
    fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) {
        if let Some(dir) = env.get(&format!("{prefix}_DIRECTORY")) {
            self.directory = Some(PathBuf::from(dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_defaults_are_valid() {
        let config = TaleweaveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://localhost:3001/api");
        assert_eq!(config.realtime.socket_url, "ws://localhost:3001/socket");
        assert_eq!(config.realtime.max_reconnect_attempts, 5);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.storage.directory.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "realtime:\n  max_reconnect_attempts: 8\nlogging:\n  format: json\n";
        let config: TaleweaveConfig = ConfigLoader::new()
            .load_str(yaml, ConfigFormat::Yaml)
            .unwrap();
        assert_eq!(config.realtime.max_reconnect_attempts, 8);
        assert_eq!(config.realtime.reconnect_delay_ms, 1_000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_short_and_long_env_overrides() {
        let env = EnvOverride::from_pairs([
            ("TALEWEAVE_API_URL", "https://api.example.com"),
            ("TALEWEAVE_SOCKET_URL", "wss://rt.example.com/socket"),
            ("TALEWEAVE_REALTIME_MAX_RECONNECT_ATTEMPTS", "3"),
            ("TALEWEAVE_API_TIMEOUT_MS", "5000"),
            ("TALEWEAVE_STORAGE_DIRECTORY", "/var/lib/taleweave"),
        ]);
        let mut config = TaleweaveConfig::default();
        config.apply_overrides(ENV_PREFIX, &env).unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.realtime.socket_url, "wss://rt.example.com/socket");
        assert_eq!(config.realtime.max_reconnect_attempts, 3);
        assert_eq!(config.api.timeout_ms, 5000);
        assert_eq!(
            config.storage.directory,
            Some(PathBuf::from("/var/lib/taleweave"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_long_form_wins_over_short_form() {
        let env = EnvOverride::from_pairs([
            ("TALEWEAVE_API_URL", "https://short.example.com"),
            ("TALEWEAVE_API_BASE_URL", "https://long.example.com"),
        ]);
        let mut config = TaleweaveConfig::default();
        config.apply_overrides(ENV_PREFIX, &env).unwrap();
        assert_eq!(config.api.base_url, "https://long.example.com");
    }

    #[test]
    fn test_bad_env_number_is_reported() {
        let env = EnvOverride::from_pairs([("TALEWEAVE_REALTIME_HEARTBEAT_INTERVAL_MS", "soon")]);
        let err = TaleweaveConfig::default()
            .apply_overrides(ENV_PREFIX, &env)
            .unwrap_err();
        assert!(err.to_string().contains("HEARTBEAT_INTERVAL_MS"));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = TaleweaveConfig::default();
        config.realtime.max_reconnect_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("realtime.max_reconnect_attempts"));

        let mut config = TaleweaveConfig::default();
        config.api.base_url = "ws://wrong-scheme".to_string();
        assert!(config.validate().is_err());

        let mut config = TaleweaveConfig::default();
        config.realtime.socket_url = "https://not-a-socket".to_string();
        assert!(config.validate().is_err());

        let mut config = TaleweaveConfig::default();
        config.realtime.max_reconnect_delay_ms = 10;
        assert!(config.validate().is_err());

        let mut config = TaleweaveConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_names() {
        let names = TaleweaveConfig::env_var_names(ENV_PREFIX);
        assert!(names.contains(&"TALEWEAVE_API_URL".to_string()));
        assert!(names.contains(&"TALEWEAVE_REALTIME_HEARTBEAT_INTERVAL_MS".to_string()));
        assert!(names.contains(&"TALEWEAVE_STORAGE_DIRECTORY".to_string()));
    }
}
