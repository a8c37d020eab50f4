//! Live-updates socket.
//!
//! [`WebSocketClient`] opens the socket with the bearer credential in the
//! query string, exchanges `{event, data}` text frames, pings on an interval,
//! and retries a dropped connection a bounded number of times with growing
//! delays. Everything it observes goes to a [`WebSocketCallback`].
//!
//! # Example
//!
//! ```ignore
//! use taleweave_gateway::ws::{EventEnvelope, WebSocketCallback, WebSocketClient, WebSocketConfig};
//!
//! struct Printer;
//!
//! #[async_trait::async_trait]
//! impl WebSocketCallback for Printer {
//!     async fn on_event(&self, envelope: EventEnvelope) {
//!         println!("{}: {}", envelope.event, envelope.data);
//!     }
//!     // ... other methods
//! }
//!
//! let config = WebSocketConfig::builder()
//!     .url("ws://localhost:3001/socket")
//!     .build();
//!
//! let mut client = WebSocketClient::new(config);
//! client.set_callback(Printer);
//! client.connect(Some(&token)).await?;
//! ```

mod client;
mod config;
mod message;
mod state;

pub use client::{WebSocketCallback, WebSocketClient};
pub use config::{WebSocketConfig, WebSocketConfigBuilder};
pub use message::{EventEnvelope, MessageCodec};
pub use state::ConnectionState;
