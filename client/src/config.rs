//! Application configuration.
//!
//! Settings come from a YAML file (`ledger.yaml`, or the path in
//! `LEDGER_CONFIG`) and are then overridden by `LEDGER_*` environment
//! variables. Every field has a default, so a missing file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::backend::domain::money::{MoneyService, DEFAULT_CURRENCY, DEFAULT_ZERO_DECIMAL_CURRENCIES};

pub const DEFAULT_CONFIG_FILE: &str = "ledger.yaml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub default_currency: String,
    pub zero_decimal_currencies: Vec<String>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            default_currency: DEFAULT_CURRENCY.to_string(),
            zero_decimal_currencies: DEFAULT_ZERO_DECIMAL_CURRENCIES
                .iter()
                .map(|code| code.to_string())
                .collect(),
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("default_currency", &self.default_currency)
            .field("zero_decimal_currencies", &self.zero_decimal_currencies)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// Load from `LEDGER_CONFIG` or `ledger.yaml`, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::load_from(Path::new(&path))?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read a YAML file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply `LEDGER_*` overrides looked up through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LEDGER_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(token) = lookup("LEDGER_API_TOKEN") {
            self.api_token = Some(token).filter(|token| !token.is_empty());
        }
        if let Some(currency) = lookup("LEDGER_CURRENCY") {
            let code = currency.trim().to_ascii_uppercase();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ConfigError::InvalidEnv {
                    name: "LEDGER_CURRENCY".to_string(),
                    value: currency,
                });
            }
            self.default_currency = code;
        }
        if let Some(level) = lookup("LEDGER_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn money_service(&self) -> MoneyService {
        MoneyService::new(&self.default_currency, self.zero_decimal_currencies.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.yaml")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "default_currency: USD\napi_token: abc123\nrequest_timeout_secs: 5").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();

        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.api_token.as_deref(), Some("abc123"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.log_level, "info");
        assert!(config.money_service().is_zero_decimal("CLP"));
        assert!(!config.money_service().is_zero_decimal("USD"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let result = AppConfig::from_yaml_str("request_timeout_secs: [not, a, number]");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LEDGER_API_BASE_URL", "https://ledger.example/api/v1"),
            ("LEDGER_CURRENCY", "jpy"),
            ("LEDGER_API_TOKEN", ""),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig {
            api_token: Some("from-file".to_string()),
            ..AppConfig::default()
        };

        config
            .apply_env_overrides(|name| env.get(name).map(|value| value.to_string()))
            .unwrap();

        assert_eq!(config.api_base_url, "https://ledger.example/api/v1");
        assert_eq!(config.default_currency, "JPY");
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_bad_currency_override_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|name| (name == "LEDGER_CURRENCY").then(|| "pesos".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = AppConfig {
            api_token: Some("top-secret".to_string()),
            ..AppConfig::default()
        };
        assert!(!format!("{:?}", config).contains("top-secret"));
    }
}
