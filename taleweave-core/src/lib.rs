//! # Taleweave Core
//!
//! The vocabulary every other Taleweave crate speaks: who the user is, what a
//! notification looks like, how failures are classified, and where settings
//! come from. Nothing here touches the network.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

/// Users, sessions, notifications, preferences
pub mod types;

/// Per-layer error enums
pub mod error;

/// Layered settings: defaults, file, `TALEWEAVE_*` environment
pub mod config;

/// Glob import for downstream crates
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{Result, TaleweaveError};
    pub use crate::types::*;
}
