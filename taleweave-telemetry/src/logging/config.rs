//! Subscriber settings.

use serde::{Deserialize, Serialize};
use taleweave_core::config::LoggingConfig;

/// What the subscriber filters, how it formats, and where it writes.
///
/// Built from the `logging` section of the client config; binaries may
/// override `level` from a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `taleweave_gateway=debug`.
    /// `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Every sink receives every line.
    #[serde(default = "default_outputs")]
    pub outputs: Vec<LogOutput>,

    /// Append source file and line.
    #[serde(default)]
    pub include_file_info: bool,

    /// Emit a line when a span opens and closes.
    #[serde(default)]
    pub include_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            outputs: default_outputs(),
            include_file_info: false,
            include_span_events: false,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(settings: &LoggingConfig) -> Self {
        let format = if settings.format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };
        Self {
            level: settings.level.clone(),
            format,
            ..Self::default()
        }
    }
}

impl LogConfig {
    /// Adds a sink.
    #[must_use]
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.outputs.push(output);
        self
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_outputs() -> Vec<LogOutput> {
    vec![LogOutput::Stderr]
}

/// Line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line, coloured when the sink is a terminal.
    #[default]
    Pretty,
}

/// Sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogOutput {
    /// stderr, so command output on stdout stays clean.
    Stderr,
    /// stdout.
    Stdout,
    /// `taleweave.log` under `path`, rolled daily.
    File {
        /// Directory, created on first write.
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.outputs, vec![LogOutput::Stderr]);
    }

    #[test]
    fn test_from_core_settings() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: "JSON".to_string(),
        };
        let config = LogConfig::from(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_output_serialization() {
        let config = LogConfig::default().with_output(LogOutput::File {
            path: "/var/log/taleweave".to_string(),
        });
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""type":"file""#));
        let parsed: LogConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.outputs.len(), 2);
    }
}
