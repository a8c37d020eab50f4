//! Structured logging for the Taleweave client.
//!
//! - JSON and pretty formats
//! - stderr, stdout, and daily-rotated file outputs
//! - `RUST_LOG` takes precedence over the configured level
//! - Credentials masked before any line is written

mod config;
mod writer;

pub use config::{LogConfig, LogFormat, LogOutput};
pub use writer::{MaskingMakeWriter, MaskingWriter};

use crate::masking::SensitiveDataMasker;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Initialize the logging system with the given configuration.
///
/// Returns guards that must be kept alive for the duration of the program
/// so buffered file output is flushed.
///
/// ```no_run
/// use taleweave_telemetry::logging::{init_logging, LogConfig};
///
/// let _guards = init_logging(&LogConfig::default()).expect("logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>, LoggingError> {
    let mut guards = Vec::new();
    let masker = Arc::new(SensitiveDataMasker::new());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LoggingError::InvalidConfig(format!("level '{}': {e}", config.level)))?;

    let mut layers: Vec<Box<dyn Layer<_> + Send + Sync>> = Vec::new();

    for output in &config.outputs {
        match output {
            LogOutput::Stderr => {
                layers.push(format_layer(
                    config,
                    MaskingMakeWriter::new(std::io::stderr, Arc::clone(&masker)),
                ));
            }
            LogOutput::Stdout => {
                layers.push(format_layer(
                    config,
                    MaskingMakeWriter::new(std::io::stdout, Arc::clone(&masker)),
                ));
            }
            LogOutput::File { path } => {
                std::fs::create_dir_all(path)?;
                let appender = tracing_appender::rolling::daily(path, "taleweave.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                layers.push(format_layer(
                    config,
                    MaskingMakeWriter::new(non_blocking, Arc::clone(&masker)),
                ));
                guards.push(guard);
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(guards)
}

fn format_layer<S, W>(config: &LogConfig, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info)
        .with_span_events(if config.include_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    match config.format {
        LogFormat::Json => base.json().flatten_event(true).boxed(),
        LogFormat::Pretty => base.boxed(),
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid logging configuration: {0}")]
    InvalidConfig(String),

    /// A global subscriber was already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            level: "taleweave=loud".to_string(),
            ..LogConfig::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_file_output_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let config = LogConfig {
            outputs: vec![LogOutput::File {
                path: logs.display().to_string(),
            }],
            ..LogConfig::default()
        };
        // Another test may have installed the global subscriber first.
        match init_logging(&config) {
            Ok(guards) => assert_eq!(guards.len(), 1),
            Err(e) => assert!(matches!(e, LoggingError::AlreadyInitialized(_))),
        }
        assert!(logs.is_dir());
    }
}
