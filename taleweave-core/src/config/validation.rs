//! Configuration validation and environment override utilities.

use crate::error::ConfigError;
use std::collections::HashMap;

/// Result type for validation operations.
pub type ValidationResult = Result<(), ConfigError>;

/// Tracks the current path in the configuration tree and the errors found so far.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    path: Vec<String>,
    errors: Vec<ConfigError>,
}

impl ValidationContext {
    /// Creates a new validation context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a new section in the configuration.
    pub fn enter(&mut self, section: impl Into<String>) {
        self.path.push(section.into());
    }

    /// Exits the current section.
    pub fn exit(&mut self) {
        self.path.pop();
    }

    /// Returns the current path as a dot-separated string.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// Adds a validation error.
    pub fn add_error(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the collected validation errors.
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Consumes the context and returns the first error, if any.
    pub fn into_result(self) -> ValidationResult {
        self.errors.into_iter().next().map_or(Ok(()), Err)
    }

    fn qualified(&self, field: &str) -> String {
        if self.path.is_empty() {
            field.to_string()
        } else {
            format!("{}.{field}", self.current_path())
        }
    }

    /// Creates a missing field error with the current path context.
    #[must_use]
    pub fn missing_field(&self, field: impl Into<String>) -> ConfigError {
        let section = (!self.path.is_empty()).then(|| self.current_path());
        ConfigError::MissingField {
            field: field.into(),
            section,
        }
    }

    /// Creates an invalid value error with the current path context.
    #[must_use]
    pub fn invalid_value(&self, field: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::invalid_value(self.qualified(field), reason)
    }
}

/// Fluent field checks that record failures into a [`ValidationContext`].
#[derive(Debug)]
pub struct Validator<'a> {
    ctx: &'a mut ValidationContext,
}

impl<'a> Validator<'a> {
    /// Creates a new validator with the given context.
    pub fn new(ctx: &'a mut ValidationContext) -> Self {
        Self { ctx }
    }

    /// Validates that a string field is not blank.
    pub fn require_non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            let err = self.ctx.missing_field(field);
            self.ctx.add_error(err);
        }
        self
    }

    /// Validates that a value lies within `min..=max`.
    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        &mut self,
        field: &str,
        value: &T,
        min: &T,
        max: &T,
    ) -> &mut Self {
        if value < min || value > max {
            let err = self.ctx.invalid_value(
                field,
                format!("Value {value} must be between {min} and {max}"),
            );
            self.ctx.add_error(err);
        }
        self
    }

    /// Validates that a numeric value is positive.
    pub fn positive<T: PartialOrd + Default + std::fmt::Display>(
        &mut self,
        field: &str,
        value: &T,
    ) -> &mut Self {
        if *value <= T::default() {
            let err = self
                .ctx
                .invalid_value(field, format!("Value {value} must be positive"));
            self.ctx.add_error(err);
        }
        self
    }

    /// Validates using a custom predicate.
    pub fn custom<F>(&mut self, field: &str, predicate: F, error_msg: &str) -> &mut Self
    where
        F: FnOnce() -> bool,
    {
        if !predicate() {
            let err = self.ctx.invalid_value(field, error_msg);
            self.ctx.add_error(err);
        }
        self
    }

    /// Validates that a URL uses one of the given schemes.
    pub fn url_with_scheme(&mut self, field: &str, value: &str, schemes: &[&str]) -> &mut Self {
        let ok = schemes.iter().any(|scheme| {
            value
                .strip_prefix(scheme)
                .and_then(|rest| rest.strip_prefix("://"))
                .is_some_and(|rest| !rest.is_empty())
        });
        if !ok {
            let expected = schemes
                .iter()
                .map(|s| format!("{s}://"))
                .collect::<Vec<_>>()
                .join(" or ");
            let err = self
                .ctx
                .invalid_value(field, format!("Must be a URL starting with {expected}"));
            self.ctx.add_error(err);
        }
        self
    }

    /// Returns the validation result.
    pub fn result(&self) -> ValidationResult {
        self.ctx.errors().first().cloned().map_or(Ok(()), Err)
    }
}

/// Source of environment overrides.
///
/// Reads the process environment by default; tests supply a fixed map instead
/// of mutating the real environment.
///
/// ```rust
/// use taleweave_core::config::EnvOverride;
///
/// let env = EnvOverride::from_pairs([("TALEWEAVE_API_TIMEOUT_MS", "5000")]);
/// let mut timeout = 30_000_u64;
/// env.apply_number("TALEWEAVE_API_TIMEOUT_MS", &mut timeout).unwrap();
/// assert_eq!(timeout, 5000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvOverride {
    fixed: Option<HashMap<String, String>>,
}

impl EnvOverride {
    /// Reads from the process environment.
    #[must_use]
    pub fn process() -> Self {
        Self { fixed: None }
    }

    /// Reads from a fixed set of pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fixed: Some(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Looks up a variable; empty values count as unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match &self.fixed {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Applies an override to a string value.
    pub fn apply_string(&self, name: &str, target: &mut String) {
        if let Some(value) = self.get(name) {
            *target = value;
        }
    }

    /// Applies an override to an optional string value.
    pub fn apply_optional_string(&self, name: &str, target: &mut Option<String>) {
        if let Some(value) = self.get(name) {
            *target = Some(value);
        }
    }

    /// Applies an override to a parsed value; unparsable input is an error.
    pub fn apply_number<T>(&self, name: &str, target: &mut T) -> ValidationResult
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(value) = self.get(name) {
            *target = value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Applies an override to a boolean value.
    pub fn apply_bool(&self, name: &str, target: &mut bool) -> ValidationResult {
        if let Some(value) = self.get(name) {
            *target = match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                other => {
                    return Err(ConfigError::InvalidEnvVar {
                        name: name.to_string(),
                        reason: format!("'{other}' is not a boolean"),
                    });
                }
            };
        }
        Ok(())
    }
}
