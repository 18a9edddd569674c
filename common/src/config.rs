use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::yaml_include::{load_yaml_with_includes, yaml_to_string};

/// Environment variable that replaces `stock_api.url` when set.
pub const STOCK_API_URL_ENV: &str = "ORDERING_STOCK_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path:?}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: yaml_rust2::ScanError,
    },

    #[error("Failed to re-emit merged YAML: {0}")]
    Emit(#[from] yaml_rust2::EmitError),

    #[error("Config does not match the expected layout: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("Invalid URL in {name}: {source}")]
    InvalidUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    pub server_address: String,
    pub log_level: String,
    /// Origin of the page hosting the order form.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StockApiConfig {
    pub url: Url,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub common: CommonConfig,
    pub backend: BackendConfig,
    pub stock_api: StockApiConfig,
}

impl Config {
    /// Loads the config file, resolving `!include` lines, then applies
    /// environment overrides.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let merged = load_yaml_with_includes(config_path.as_ref())?;
        let mut config = Self::from_yaml_str(&yaml_to_string(&merged)?)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(contents)?)
    }

    /// `lookup` is `std::env::var` in production; tests pass a closure.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(STOCK_API_URL_ENV) {
            self.stock_api.url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
                name: STOCK_API_URL_ENV.to_string(),
                source,
            })?;
            tracing::info!(url = %self.stock_api.url, "Stock API URL overridden from environment");
        }
        Ok(())
    }
}
