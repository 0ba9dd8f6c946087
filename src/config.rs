//! Configuration management: storage format and data location.

use std::env;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Persisted encodings supported by the store, chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    Csv,
    Json,
}

impl Default for StorageFormat {
    fn default() -> Self {
        StorageFormat::Csv
    }
}

impl StorageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageFormat::Csv => "csv",
            StorageFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StorageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(StorageFormat::Csv),
            "json" => Ok(StorageFormat::Json),
            other => Err(format!("Invalid storage format: {}", other)),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub format: StorageFormat,
    /// Directory holding the data files.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Built-in defaults are layered under `config/default`, an
    /// optional `config/{RUN_MODE}` file and `MEDIATHEQUE_`-prefixed
    /// environment variables, so running without any file works.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("storage.format", "csv")?
            .set_default("storage.path", "data")?
            .set_default("logging.level", "info")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("MEDIATHEQUE")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::load().expect("defaults should deserialize");
        assert_eq!(config.storage.format, StorageFormat::Csv);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse(), Ok(StorageFormat::Json));
        assert_eq!(" csv ".parse(), Ok(StorageFormat::Csv));
        assert!("xml".parse::<StorageFormat>().is_err());
    }
}
