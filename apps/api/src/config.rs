//! API server configuration

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use threadline_shared_config::{
    parse_env, CommonConfig, DatabaseConfig, Environment, StorageBackend,
};

use crate::graphql::loaders::{BatchConfig, LoaderSettings};
use crate::graphql::{ResolverSettings, DEFAULT_MAX_DEPTH};
use crate::models::User;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// Per-request timeout in seconds (default: 4)
    pub request_timeout_secs: u64,

    /// Maximum GraphQL query depth (default: 16)
    pub graphql_max_depth: usize,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,

    /// Users loaded into the in-memory backend at startup
    pub seed_users: Vec<User>,

    /// Loader timings and mutation checks
    pub resolver: ResolverSettings,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode with the postgres backend, `DATABASE_URL` must be
    /// set explicitly. Everything else falls back to development defaults.
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if common.environment.is_production() && common.storage.requires_database() {
            Self::validate_database_url()?;
        }

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 4)?,

            graphql_max_depth: parse_env("GRAPHQL_MAX_DEPTH", DEFAULT_MAX_DEPTH)?,

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),

            seed_users: parse_seed_users(&env::var("SEED_USERS").unwrap_or_default())?,

            resolver: Self::load_resolver_settings()?,
        })
    }

    /// Read loader tuning and the parent validation switch
    ///
    /// `ENTITY_LOADER_*` tunes the users and posts loaders. `COMMENT_LOADER_*`
    /// tunes the three comment loaders.
    fn load_resolver_settings() -> Result<ResolverSettings> {
        let defaults = LoaderSettings::default();

        let entity = BatchConfig::new(
            Duration::from_millis(parse_env(
                "ENTITY_LOADER_WAIT_MS",
                defaults.entity.wait.as_millis() as u64,
            )?),
            parse_env("ENTITY_LOADER_MAX_BATCH", defaults.entity.max_batch)?,
        );
        let comment = BatchConfig::new(
            Duration::from_millis(parse_env(
                "COMMENT_LOADER_WAIT_MS",
                defaults.comment.wait.as_millis() as u64,
            )?),
            parse_env("COMMENT_LOADER_MAX_BATCH", defaults.comment.max_batch)?,
        );

        Ok(ResolverSettings {
            loaders: LoaderSettings { entity, comment },
            strict_parent_validation: parse_env("STRICT_PARENT_VALIDATION", false)?,
        })
    }

    /// Validate that DATABASE_URL is explicitly set in production
    fn validate_database_url() -> Result<()> {
        match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => Ok(()),
            _ => {
                bail!(
                    "DATABASE_URL environment variable is required in production \
                     when STORAGE_BACKEND=postgres. Please set your PostgreSQL connection string."
                );
            }
        }
    }

    // Convenience accessors for common config fields

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Get the configured storage backend
    pub fn storage(&self) -> StorageBackend {
        self.common.storage
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }

    /// Fallback tracing filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> String {
        format!("threadline_api={0},tower_http={0}", self.common.log_level)
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parse `SEED_USERS` entries of the form `id:username`, comma separated
fn parse_seed_users(raw: &str) -> Result<Vec<User>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, username) = entry
                .split_once(':')
                .with_context(|| format!("Invalid SEED_USERS entry '{}', expected id:username", entry))?;
            let id = id
                .trim()
                .parse()
                .with_context(|| format!("Invalid user id in SEED_USERS entry '{}'", entry))?;
            let username = username.trim();
            if username.is_empty() {
                bail!("Empty username in SEED_USERS entry '{}'", entry);
            }
            Ok(User {
                id,
                username: username.to_string(),
            })
        })
        .collect()
}
