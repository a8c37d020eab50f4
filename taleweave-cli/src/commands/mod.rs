//! CLI command implementations.

pub mod auth;
pub mod resources;
pub mod watch;
