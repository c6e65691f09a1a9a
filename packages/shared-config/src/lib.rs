//! Shared configuration types for Threadline services
//!
//! This crate provides the configuration pieces every Threadline binary needs:
//! environment mode, storage backend selection and database settings.

mod database;
mod error;
mod storage;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ConfigResult};
pub use storage::StorageBackend;

use std::env;

/// Common configuration shared between all services
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Database configuration (used by the postgres backend)
    pub database: DatabaseConfig,

    /// Which storage backend serves posts, comments and users
    pub storage: StorageBackend,

    /// Environment mode (development or production)
    pub environment: Environment,

    /// Default log level for this workspace's crates (from LOG_LEVEL)
    ///
    /// `RUST_LOG`, when set, replaces the whole filter instead.
    pub log_level: String,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        })
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            storage: get_env_or_default("STORAGE_BACKEND", "memory").parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse()
                .unwrap_or_default(),
            log_level: get_env_or_default("LOG_LEVEL", "debug"),
        })
    }
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "stage".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "anything".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(format!("{}", Environment::Production), "production");
        assert_eq!(format!("{}", Environment::Development), "development");
    }

    #[test]
    fn test_environment_checks() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Development.is_production());
        assert!(!Environment::default().is_production());
    }

    #[test]
    fn test_parse_env_invalid_value() {
        temp_env::with_var("THREADLINE_TEST_PARSE", Some("not-a-number"), || {
            let result = parse_env::<u32>("THREADLINE_TEST_PARSE", 5);
            assert!(matches!(result, Err(ConfigError::InvalidValue(name, _)) if name == "THREADLINE_TEST_PARSE"));
        });
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        temp_env::with_var_unset("THREADLINE_TEST_UNSET", || {
            assert_eq!(parse_env::<u32>("THREADLINE_TEST_UNSET", 7).unwrap(), 7);
        });
    }

    #[test]
    fn test_common_config_defaults_to_memory_storage() {
        temp_env::with_vars_unset(["STORAGE_BACKEND", "ENVIRONMENT", "LOG_LEVEL"], || {
            let config = CommonConfig::from_env().unwrap();
            assert_eq!(config.storage, StorageBackend::Memory);
            assert_eq!(config.environment, Environment::Development);
            assert_eq!(config.log_level, "debug");
        });
    }

    #[test]
    fn test_common_config_reads_log_level() {
        temp_env::with_var("LOG_LEVEL", Some("warn"), || {
            assert_eq!(CommonConfig::from_env().unwrap().log_level, "warn");
        });
    }
}
