//! Configuration management module.
//!
//! - YAML, TOML, and JSON configuration files
//! - Validation with path-qualified error messages
//! - Environment variable overrides under the `TALEWEAVE_` prefix
//!
//! ```rust,ignore
//! use taleweave_core::config::{ConfigLoader, TaleweaveConfig, ENV_PREFIX};
//!
//! let config: TaleweaveConfig = ConfigLoader::new()
//!     .with_env_prefix(ENV_PREFIX)
//!     .load(None)?;
//! ```

mod app_config;
mod loader;
mod traits;
pub mod validation;

pub use app_config::{
    ApiConfig, ENV_PREFIX, LoggingConfig, RealtimeConfig, StorageConfig, TaleweaveConfig,
};
pub use loader::{ConfigFormat, ConfigLoader};
pub use traits::{Configurable, Validatable};
pub use validation::{EnvOverride, ValidationContext, ValidationResult, Validator};
