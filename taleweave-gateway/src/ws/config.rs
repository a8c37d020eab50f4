//! Live-updates socket settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use taleweave_core::config::{RealtimeConfig, Validatable, ValidationContext, Validator};
use taleweave_core::error::ConfigError;

const CONNECT_TIMEOUT_MS: u64 = 10_000;
const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_DELAY_MS: u64 = 1_000;
const MAX_RECONNECT_DELAY_MS: u64 = 5_000;
const BACKOFF_MULTIPLIER: f64 = 2.0;
const HEARTBEAT_INTERVAL_MS: u64 = 25_000;

const fn yes() -> bool {
    true
}

const fn connect_timeout_ms() -> u64 {
    CONNECT_TIMEOUT_MS
}

const fn max_reconnect_attempts() -> u32 {
    MAX_RECONNECT_ATTEMPTS
}

const fn reconnect_delay_ms() -> u64 {
    RECONNECT_DELAY_MS
}

const fn max_reconnect_delay_ms() -> u64 {
    MAX_RECONNECT_DELAY_MS
}

const fn backoff_multiplier() -> f64 {
    BACKOFF_MULTIPLIER
}

const fn heartbeat_interval_ms() -> u64 {
    HEARTBEAT_INTERVAL_MS
}

/// Settings for the live-updates socket.
///
/// Retries are bounded: a zero `max_reconnect_attempts` is rejected by
/// [`Validatable::validate`], and after the last attempt the transport
/// reports failure instead of looping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// `ws://` or `wss://` endpoint of the live-updates server.
    pub url: String,

    /// How long a single handshake may take.
    #[serde(default = "connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Retry after an unexpected close.
    #[serde(default = "yes")]
    pub reconnect_enabled: bool,

    /// Retries allowed after a drop before giving up.
    #[serde(default = "max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Wait before the first retry.
    #[serde(default = "reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Ceiling for the growing retry wait.
    #[serde(default = "max_reconnect_delay_ms")]
    pub max_reconnect_delay_ms: u64,

    /// Growth factor applied per retry.
    #[serde(default = "backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Gap between keepalive pings.
    #[serde(default = "heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Send keepalive pings and treat a missing reply as a drop.
    #[serde(default = "yes")]
    pub auto_ping: bool,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            reconnect_enabled: true,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_delay_ms: RECONNECT_DELAY_MS,
            max_reconnect_delay_ms: MAX_RECONNECT_DELAY_MS,
            backoff_multiplier: BACKOFF_MULTIPLIER,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            auto_ping: true,
        }
    }
}

impl From<&RealtimeConfig> for WebSocketConfig {
    fn from(realtime: &RealtimeConfig) -> Self {
        Self {
            url: realtime.socket_url.clone(),
            max_reconnect_attempts: realtime.max_reconnect_attempts,
            reconnect_delay_ms: realtime.reconnect_delay_ms,
            max_reconnect_delay_ms: realtime.max_reconnect_delay_ms,
            heartbeat_interval_ms: realtime.heartbeat_interval_ms,
            ..Self::default()
        }
    }
}

impl WebSocketConfig {
    /// Starts from the defaults.
    #[must_use]
    pub fn builder() -> WebSocketConfigBuilder {
        WebSocketConfigBuilder {
            config: Self::default(),
        }
    }

    /// Handshake deadline.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Keepalive period.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Wait before retry number `attempt + 1`.
    ///
    /// Grows by `backoff_multiplier` each time and never exceeds
    /// `max_reconnect_delay_ms`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn calculate_reconnect_delay(&self, attempt: u32) -> Duration {
        let ceiling = self.max_reconnect_delay_ms as f64;
        let grown = self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32)
            * self.reconnect_delay_ms as f64;
        Duration::from_millis(grown.min(ceiling) as u64)
    }

    /// True while retries remain after `attempt` failures.
    #[must_use]
    pub fn should_reconnect(&self, attempt: u32) -> bool {
        self.reconnect_enabled && attempt < self.max_reconnect_attempts
    }
}

impl Validatable for WebSocketConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();
        ctx.enter("realtime");
        Validator::new(&mut ctx)
            .url_with_scheme("url", &self.url, &["ws", "wss"])
            .positive("connect_timeout_ms", &self.connect_timeout_ms)
            .positive("max_reconnect_attempts", &self.max_reconnect_attempts)
            .custom(
                "max_reconnect_delay_ms",
                || self.max_reconnect_delay_ms >= self.reconnect_delay_ms,
                "Must not be smaller than reconnect_delay_ms",
            )
            .custom(
                "backoff_multiplier",
                || self.backoff_multiplier >= 1.0,
                "Must be at least 1.0",
            )
            .positive("heartbeat_interval_ms", &self.heartbeat_interval_ms)
            .result()
    }
}

/// Fluent construction of a [`WebSocketConfig`].
#[derive(Debug, Clone)]
pub struct WebSocketConfigBuilder {
    config: WebSocketConfig,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl WebSocketConfigBuilder {
    /// Endpoint URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Handshake deadline.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = millis(timeout);
        self
    }

    /// Turns automatic retry on or off.
    #[must_use]
    pub fn reconnect_enabled(mut self, enabled: bool) -> Self {
        self.config.reconnect_enabled = enabled;
        self
    }

    /// Retry budget.
    #[must_use]
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = attempts;
        self
    }

    /// First retry wait.
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay_ms = millis(delay);
        self
    }

    /// Retry wait ceiling.
    #[must_use]
    pub fn max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.max_reconnect_delay_ms = millis(delay);
        self
    }

    /// Retry wait growth factor.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.config.backoff_multiplier = multiplier;
        self
    }

    /// Keepalive period.
    #[must_use]
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval_ms = millis(interval);
        self
    }

    /// Turns keepalive pings on or off.
    #[must_use]
    pub fn auto_ping(mut self, enabled: bool) -> Self {
        self.config.auto_ping = enabled;
        self
    }

    /// Finishes the builder. Call [`Validatable::validate`] before use.
    #[must_use]
    pub fn build(self) -> WebSocketConfig {
        self.config
    }
}
