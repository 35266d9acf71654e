//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use switchyard_telemetry::LogFormat;

use crate::{ConfigError, SwitchyardConfig};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use switchyard_config::ConfigLoader;
///
/// # fn main() -> Result<(), switchyard_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("switchyard.toml")?
///     .with_env_prefix("SWITCHYARD")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SwitchyardConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SwitchyardConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with development preset configuration.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SwitchyardConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SwitchyardConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [dispatch]
    ///     match_cache_capacity = 1000
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.dispatch.match_cache_capacity, 1000);
    /// assert_eq!(config.dispatch.pool_capacity, 50);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(format.to_string()))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `SWITCHYARD__DISPATCH__POOL_CAPACITY=100` or
    /// `SWITCHYARD__LOGGING__LEVEL=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if present.
    ///
    /// # Errors
    ///
    /// Currently infallible; a missing `.env` file is not an error.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation fails.
    pub fn load(mut self) -> Result<SwitchyardConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SwitchyardConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<SwitchyardConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::bad_override(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["DISPATCH", "POOL_CAPACITY"] => {
                config.dispatch.pool_capacity = parse_number(key, value)?;
            }
            ["DISPATCH", "MATCH_CACHE_CAPACITY"] => {
                config.dispatch.match_cache_capacity = parse_number(key, value)?;
            }
            ["DISPATCH", "NORMALIZE_CACHE_CAPACITY"] => {
                config.dispatch.normalize_cache_capacity = parse_number(key, value)?;
            }

            ["LOGGING", "ENABLED"] => {
                config.logging.enabled = parse_flag(key, value)?;
            }
            ["LOGGING", "LEVEL"] => {
                config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::bad_override(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_TARGET"] => {
                config.logging.include_target = parse_flag(key, value)?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = parse_flag(key, value)?;
            }

            ["METRICS", "ENABLED"] => {
                config.metrics.enabled = parse_flag(key, value)?;
            }
            ["METRICS", "LISTEN_ADDR"] => {
                config.metrics.listen_addr = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            // Unknown keys are ignored
            _ => {}
        }

        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::bad_override(key, "expected integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::bad_override(key, "expected boolean"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, SwitchyardConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"dispatch": {"pool_capacity": 16}, "metrics": {"enabled": true}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.dispatch.pool_capacity, 16);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_loader_rejects_unknown_section() {
        let result = ConfigLoader::new().with_string("[server]\nport = 1", "toml");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_loader_rejects_unknown_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[dispatch]\nnormalize_cache_capacity = 32\n\n[logging]\nlevel = \"warn\""
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

        assert_eq!(config.dispatch.normalize_cache_capacity, 32);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_loader_with_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/switchyard.toml");
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/switchyard.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.dispatch.pool_capacity, 50);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));

        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));

        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    // Overrides are exercised through `apply_env_var`; mutating the process
    // environment would need `unsafe`, which the workspace forbids.

    #[test]
    fn test_apply_env_var_dispatch() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__DISPATCH__POOL_CAPACITY", "100", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__DISPATCH__MATCH_CACHE_CAPACITY", "2000", "TEST")
            .unwrap();
        assert_eq!(loader.config.dispatch.pool_capacity, 100);
        assert_eq!(loader.config.dispatch.match_cache_capacity, 2000);
    }

    #[test]
    fn test_apply_env_var_logging_and_metrics() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__LOGGING__FORMAT", "pretty", "TEST").unwrap();
        loader.apply_env_var("TEST__METRICS__ENABLED", "yes", "TEST").unwrap();
        loader
            .apply_env_var("TEST__METRICS__LISTEN_ADDR", "127.0.0.1:9100", "TEST")
            .unwrap();

        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert!(loader.config.metrics.enabled);
        assert_eq!(loader.config.metrics.listen_addr.as_deref(), Some("127.0.0.1:9100"));
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__DISPATCH__POOL_CAPACITY", "lots", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
        assert!(loader.apply_env_var("TESTDISPATCH", "1", "TEST").is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__PORT", "8080", "TEST").unwrap();
        assert_eq!(loader.config, SwitchyardConfig::default());
    }
}
