//! Server configuration, loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::auth::{is_token_digest, ApiUser};
use crate::catalog::CatalogConfig;
use crate::engine::EngineConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("User {0} has a token_sha256 that is not a hex SHA-256 digest")]
    InvalidTokenDigest(String),
}

/// Top-level configuration. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub address: String,
    pub port: u16,
    /// Path of the sqlite database holding saved schedules
    pub database_path: String,
    /// One of "trace", "debug", "info", "warn", "error"
    pub log_level: String,
    pub catalog: CatalogConfig,
    pub engine: EngineConfig,
    pub users: Vec<ApiUser>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "schedules.db".to_string(),
            log_level: "info".to_string(),
            catalog: CatalogConfig::default(),
            engine: EngineConfig {
                max_schedules: Some(10_000),
                parallel_threshold: Some(100_000),
                ..EngineConfig::default()
            },
            users: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads and validates the config file at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.log_level()?;

        if let Some(user) = self.users.iter().find(|u| !is_token_digest(&u.token_sha256)) {
            return Err(ConfigError::InvalidTokenDigest(user.username.clone()));
        }

        Ok(())
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_token;
    use crate::engine::UnknownSectionPolicy;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
        assert_eq!(config.engine.max_schedules, Some(10_000));
        assert_eq!(config.engine.unknown_sections, UnknownSectionPolicy::Reject);
        assert_eq!(config.catalog, CatalogConfig::default());
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let json = format!(
            r#"{{
                "port": 9000,
                "log_level": "debug",
                "catalog": {{ "cache_ttl_secs": 60 }},
                "engine": {{ "unknown_sections": "unconstrained" }},
                "users": [{{ "username": "alice", "token_sha256": "{}" }}]
            }}"#,
            hash_token("alice-secret")
        );

        let config = AppConfig::from_json(&json).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(config.catalog.cache_ttl_secs, 60);
        assert_eq!(config.catalog.timeout_secs, 30);
        assert_eq!(
            config.engine.unknown_sections,
            UnknownSectionPolicy::Unconstrained
        );
        // A partial engine section falls back to the field defaults, not the server defaults.
        assert_eq!(config.engine.max_schedules, None);
        assert_eq!(config.users[0].username, "alice");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "log_level": "loud" }"#),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{ "users": [{ "username": "bob", "token_sha256": "xyz" }] }"#),
            Err(ConfigError::InvalidTokenDigest(name)) if name == "bob"
        ));
        assert!(matches!(
            AppConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
