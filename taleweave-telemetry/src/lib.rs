//! # Taleweave Telemetry
//!
//! Tracing setup for Taleweave binaries. Call [`logging::init_logging`] once
//! at startup; everything else in the workspace only emits `tracing` events
//! and enters the spans from [`spans`]. Credentials are scrubbed from every
//! line before it reaches a sink.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Subscriber setup
pub mod logging;

/// Credential scrubbing
pub mod masking;

/// Named spans shared across crates
pub mod spans;

/// Glob import for binaries
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat, LogOutput, init_logging};
    pub use crate::masking::SensitiveDataMasker;
    pub use crate::spans::*;
}
