//! # Taleweave Client
//!
//! Client runtime for the Taleweave platform.
//!
//! This crate provides:
//! - A shared state store with a persisted subset
//! - The realtime connection manager and its event fan-out bridge
//! - Backend services that fall back to cached or static content
//! - [`AppContext`], which wires all of the above to one configuration
//!
//! # Example
//!
//! ```ignore
//! use taleweave_client::AppContext;
//! use taleweave_core::config::{ConfigLoader, ENV_PREFIX};
//!
//! let config = ConfigLoader::new().with_env_prefix(ENV_PREFIX).load(None)?;
//! let context = AppContext::new(config)?;
//! context.auth().login("rivera@example.com", "secret").await?;
//! context.realtime().connect().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

/// Local signal bus
pub mod bus;

/// Application context
pub mod context;

/// Realtime event registry and bridge
pub mod events;

/// Store-backed session hooks
pub mod hooks;

/// Realtime connection manager
pub mod realtime;

/// Backend services
pub mod services;

/// Client state store and persistence
pub mod store;

pub use context::AppContext;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bus::{LocalBus, Route, Toast, UiSignal};
    pub use crate::context::AppContext;
    pub use crate::events::{DispatchOutcome, EventBridge, EventKind, RealtimeEvent};
    pub use crate::hooks::StoreSessionHooks;
    pub use crate::realtime::{HandlerId, RealtimeManager};
    pub use crate::services::{AuthService, ResourceService};
    pub use crate::store::{PersistedState, StatePersistence, Store};
}
