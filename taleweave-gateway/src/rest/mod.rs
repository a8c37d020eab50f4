//! REST client infrastructure.
//!
//! This module provides the backend client with:
//! - Bearer credentials read from a [`SessionHooks`] collaborator
//! - One credential refresh and one replay on `401`
//! - Error classification into [`ApiError`](taleweave_core::error::ApiError)
//! - In-flight request accounting
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use taleweave_gateway::rest::{ApiClient, MemorySession, RestConfig};
//!
//! let config = RestConfig::builder()
//!     .base_url("http://localhost:3001/api")
//!     .build();
//!
//! let client = ApiClient::new(config, Arc::new(MemorySession::default()))?;
//! let me: serde_json::Value = client.get("/user/me").await?;
//! ```

mod client;
mod config;
mod hooks;

pub use client::{ApiClient, extract_token};
pub use config::{RestConfig, RestConfigBuilder};
pub use hooks::{MemorySession, SessionHooks};
