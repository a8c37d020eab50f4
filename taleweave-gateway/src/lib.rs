//! # Taleweave Gateway
//!
//! The two wires to the Taleweave backend. [`rest`] sends JSON requests with
//! the bearer credential, refreshing it once on a 401 before giving up.
//! [`ws`] keeps the live-updates socket open with a bounded retry budget.
//! Neither side owns application state; they report through the
//! [`rest::SessionHooks`] and [`ws::WebSocketCallback`] seams.
//!
//! # Example
//!
//! ```ignore
//! use taleweave_gateway::ws::{WebSocketClient, WebSocketConfig};
//!
//! let config = WebSocketConfig::builder()
//!     .url("ws://localhost:3001/socket")
//!     .build();
//!
//! let client = WebSocketClient::new(config);
//! client.connect(Some(&token)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

/// Live-updates socket
pub mod ws;

/// HTTP client
pub mod rest;

/// Glob import for the client crate
pub mod prelude {
    pub use crate::rest::{ApiClient, MemorySession, RestConfig, RestConfigBuilder, SessionHooks};
    pub use crate::ws::{
        ConnectionState, EventEnvelope, MessageCodec, WebSocketCallback, WebSocketClient,
        WebSocketConfig, WebSocketConfigBuilder,
    };
}
