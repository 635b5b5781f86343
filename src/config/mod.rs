use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tonapi: TonApiConfig,
    #[serde(default)]
    pub address: AddressConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TonApiConfig {
    /// tonapi REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Collection contract address whose items are enumerated
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Accept-Language header sent with history requests
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressConfig {
    /// Render report addresses in friendly form (false = raw API strings)
    #[serde(default = "default_true")]
    pub friendly_output: bool,
    /// Bounceable tag on rendered addresses
    #[serde(default = "default_true")]
    pub bounceable: bool,
    /// URL-safe base64 alphabet for rendered addresses
    #[serde(default = "default_true")]
    pub url_safe: bool,
    /// Testnet-only tag bit
    #[serde(default)]
    pub testnet: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_base_url() -> String {
    "https://tonapi.io".to_string()
}
fn default_collection() -> String {
    "EQBluYU_TlovKRwG1-InhSyYYec2LY89h4Ly7oEMwjhJH6l3".to_string()
}
fn default_accept_language() -> String {
    "ru-RU,ru;q=0.5".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for TonApiConfig {
    fn default() -> Self {
        TonApiConfig {
            base_url: default_base_url(),
            collection: default_collection(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        AddressConfig {
            friendly_output: true,
            bounceable: true,
            url_safe: true,
            testnet: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Every field has a default, so a
    /// partial (or empty) file is fine.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tonapi.base_url, "https://tonapi.io");
        assert_eq!(
            config.tonapi.collection,
            "EQBluYU_TlovKRwG1-InhSyYYec2LY89h4Ly7oEMwjhJH6l3"
        );
        assert_eq!(config.tonapi.accept_language, "ru-RU,ru;q=0.5");
        assert!(config.address.friendly_output);
        assert!(config.address.bounceable);
        assert!(config.address.url_safe);
        assert!(!config.address.testnet);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: Config = toml::from_str(
            r#"
            [tonapi]
            collection = "EQAAAA"

            [address]
            friendly_output = false

            [logging]
            level = "debug"
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.tonapi.collection, "EQAAAA");
        assert_eq!(config.tonapi.base_url, "https://tonapi.io");
        assert!(!config.address.friendly_output);
        assert!(config.address.bounceable);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }
}
