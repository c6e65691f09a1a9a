//! Storage backend selection

use crate::ConfigError;

/// Backend that owns posts, comments and users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// PostgreSQL via `DATABASE_URL`
    Postgres,
}

impl StorageBackend {
    /// Whether this backend needs a database connection
    pub fn requires_database(&self) -> bool {
        matches!(self, Self::Postgres)
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(ConfigError::InvalidValue(
                "STORAGE_BACKEND".to_string(),
                format!("unknown backend '{}', expected memory or postgres", other),
            )),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Postgres => write!(f, "postgres"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("PG".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!(
            " postgresql ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Postgres
        );
    }

    #[test]
    fn test_storage_backend_rejects_unknown() {
        let err = "sqlite".parse::<StorageBackend>().unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }

    #[test]
    fn test_requires_database() {
        assert!(StorageBackend::Postgres.requires_database());
        assert!(!StorageBackend::Memory.requires_database());
    }
}
