//! Configuration traits for validation and environment overrides.

use super::validation::EnvOverride;
use crate::error::ConfigError;

/// Trait for types that can be validated.
///
/// ```rust
/// use taleweave_core::config::Validatable;
/// use taleweave_core::error::ConfigError;
///
/// struct ApiSection {
///     timeout_ms: u64,
/// }
///
/// impl Validatable for ApiSection {
///     fn validate(&self) -> Result<(), ConfigError> {
///         if self.timeout_ms == 0 {
///             return Err(ConfigError::invalid_value("timeout_ms", "must be positive"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Returns `Ok(())` if the configuration is valid, or the first problem found.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Trait for types whose fields can be overridden from the environment.
pub trait Configurable: Sized {
    /// Applies overrides from `env` for variables under `prefix`.
    fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) -> Result<(), ConfigError>;

    /// Returns the variable names this configuration reads.
    fn env_var_names(prefix: &str) -> Vec<String>;

    /// Applies overrides from the process environment.
    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        self.apply_overrides(prefix, &EnvOverride::process())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Retry {
        attempts: u32,
    }

    impl Validatable for Retry {
        fn validate(&self) -> Result<(), ConfigError> {
            if self.attempts == 0 {
                return Err(ConfigError::invalid_value("attempts", "must be at least 1"));
            }
            Ok(())
        }
    }

    impl Configurable for Retry {
        fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) -> Result<(), ConfigError> {
            env.apply_number(&format!("{prefix}_ATTEMPTS"), &mut self.attempts)
        }

        fn env_var_names(prefix: &str) -> Vec<String> {
            vec![format!("{prefix}_ATTEMPTS")]
        }
    }

    #[test]
    fn test_overrides_then_validate() {
        let mut retry = Retry { attempts: 3 };
        retry
            .apply_overrides("R", &EnvOverride::from_pairs([("R_ATTEMPTS", "0")]))
            .unwrap();
        assert_eq!(retry.attempts, 0);
        assert!(retry.validate().is_err());
        assert_eq!(Retry::env_var_names("R"), vec!["R_ATTEMPTS".to_string()]);
    }
}
