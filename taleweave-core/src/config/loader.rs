//! Configuration loading from YAML, TOML, or JSON files.
//!
//! Loading is layered: built-in defaults, then the optional file, then
//! environment overrides, then validation.

use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use std::path::Path;

use super::{Configurable, Validatable};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml)
    #[default]
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "yaml" | "yml" => Some(Self::Yaml),
                "toml" => Some(Self::Toml),
                "json" => Some(Self::Json),
                _ => None,
            })
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// Layered configuration loader.
///
/// ```rust,ignore
/// use taleweave_core::config::{ConfigLoader, TaleweaveConfig};
///
/// let config: TaleweaveConfig = ConfigLoader::new()
///     .with_env_prefix("TALEWEAVE")
///     .load(Some("taleweave.yaml".as_ref()))?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: Option<String>,
    validate: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader that validates and applies no environment overrides.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env_prefix: None,
            validate: true,
        }
    }

    /// Sets the environment variable prefix for overrides (e.g. `TALEWEAVE`).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Sets whether to validate the configuration after loading.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Returns the environment variable prefix, if set.
    #[must_use]
    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Loads defaults, the optional file, and environment overrides, then validates.
    pub fn load<T>(&self, path: Option<&Path>) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default + Configurable + Validatable,
    {
        let mut config = match path {
            Some(path) => self.load_file(path)?,
            None => T::default(),
        };
        self.finish(&mut config)?;
        Ok(config)
    }

    /// Parses a file, detecting the format from its extension.
    pub fn load_file<T, P>(&self, path: P) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            ConfigError::invalid_format(
                path.display().to_string(),
                "Unrecognized file extension. Supported: .yaml, .yml, .toml, .json",
            )
        })?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::file_read_error(path.display().to_string(), e.to_string()))?;

        parse(&content, format, &path.display().to_string())
    }

    /// Parses configuration text, then applies overrides and validation.
    pub fn load_str<T>(&self, content: &str, format: ConfigFormat) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Configurable + Validatable,
    {
        let mut config = parse(content, format, "<string>")?;
        self.finish(&mut config)?;
        Ok(config)
    }

    fn finish<T>(&self, config: &mut T) -> Result<(), ConfigError>
    where
        T: Configurable + Validatable,
    {
        if let Some(prefix) = &self.env_prefix {
            config.apply_env_overrides(prefix)?;
        }
        if self.validate {
            config.validate()?;
        }
        Ok(())
    }
}

fn parse<T: DeserializeOwned>(
    content: &str,
    format: ConfigFormat,
    origin: &str,
) -> Result<T, ConfigError> {
    let result = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };
    result.map_err(|reason| {
        ConfigError::invalid_format(origin, format!("{} parse error: {reason}", format.label()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvOverride;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Sample {
        host: String,
        #[serde(default)]
        port: u16,
    }

    impl Validatable for Sample {
        fn validate(&self) -> Result<(), ConfigError> {
            if self.port == 0 {
                return Err(ConfigError::invalid_value("port", "must be positive"));
            }
            Ok(())
        }
    }

    impl Configurable for Sample {
        fn apply_overrides(&mut self, prefix: &str, env: &EnvOverride) -> Result<(), ConfigError> {
            env.apply_string(&format!("{prefix}_HOST"), &mut self.host);
            Ok(())
        }

        fn env_var_names(prefix: &str) -> Vec<String> {
            vec![format!("{prefix}_HOST")]
        }
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.TOML")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("a.txt")), None);
    }

    #[test]
    fn test_load_str_each_format() {
        let loader = ConfigLoader::new();
        let yaml: Sample = loader
            .load_str("host: a\nport: 1\n", ConfigFormat::Yaml)
            .unwrap();
        let toml: Sample = loader
            .load_str("host = \"a\"\nport = 1\n", ConfigFormat::Toml)
            .unwrap();
        let json: Sample = loader
            .load_str(r#"{"host":"a","port":1}"#, ConfigFormat::Json)
            .unwrap();
        assert_eq!(yaml, toml);
        assert_eq!(toml, json);
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = ConfigLoader::new()
            .load_str::<Sample>("host: [", ConfigFormat::Yaml)
            .unwrap_err();
        assert!(err.to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_sample_overrides_host() {
        let mut sample = Sample {
            host: "a".into(),
            port: 1,
        };
        sample
            .apply_overrides("S", &EnvOverride::from_pairs([("S_HOST", "b")]))
            .unwrap();
        assert_eq!(sample.host, "b");
        assert_eq!(Sample::env_var_names("S"), vec!["S_HOST".to_string()]);
    }

    #[test]
    fn test_validation_toggle() {
        let content = "host: a\n";
        assert!(
            ConfigLoader::new()
                .load_str::<Sample>(content, ConfigFormat::Yaml)
                .is_err()
        );
        assert!(
            ConfigLoader::new()
                .with_validation(false)
                .load_str::<Sample>(content, ConfigFormat::Yaml)
                .is_ok()
        );
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "host = \"h\"\nport = 9\n").unwrap();

        let config: Sample = ConfigLoader::new().load(Some(&path)).unwrap();
        assert_eq!(config.port, 9);

        let missing = dir.path().join("absent.yaml");
        let err = ConfigLoader::new().load::<Sample>(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));

        let bad_ext = dir.path().join("client.ini");
        std::fs::write(&bad_ext, "x").unwrap();
        let err = ConfigLoader::new().load::<Sample>(Some(&bad_ext)).unwrap_err();
        assert!(err.to_string().contains("Unrecognized file extension"));
    }
}
