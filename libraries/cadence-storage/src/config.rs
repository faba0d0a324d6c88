/// Storage and evaluation settings
use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory by [`StorageConfig::load`]
pub const CONFIG_FILE: &str = "cadence.toml";

/// Prefix for environment overrides, e.g. `CADENCE_MAX_PER_PAGE=200`
pub const ENV_PREFIX: &str = "CADENCE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// Page size when the caller does not ask for one
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,

    /// Compiled smart playlist expressions kept in memory
    #[serde(default = "default_expression_cache_size")]
    pub expression_cache_size: usize,
}

impl StorageConfig {
    /// Load from `cadence.toml` (if present) and `CADENCE_*` variables
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from a specific file (skipped if missing), then the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(PathBuf::from(path)));
        }

        // Keys are flat, so only the prefix is split off: CADENCE_DATABASE_URL -> database_url
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            database_url = %config.database_url,
            max_per_page = config.max_per_page,
            cache = config.expression_cache_size,
            "loaded storage configuration"
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(StorageError::Config("database_url is required".to_string()));
        }

        if self.max_connections == 0 {
            return Err(StorageError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if self.default_per_page == 0 || self.max_per_page == 0 {
            return Err(StorageError::Config(
                "page sizes must be at least 1".to_string(),
            ));
        }

        if self.default_per_page > self.max_per_page {
            return Err(StorageError::Config(format!(
                "default_per_page ({}) exceeds max_per_page ({})",
                self.default_per_page, self.max_per_page
            )));
        }

        if self.expression_cache_size == 0 {
            return Err(StorageError::Config(
                "expression_cache_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn busy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.busy_timeout_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            expression_cache_size: default_expression_cache_size(),
        }
    }
}

// Default values
fn default_database_url() -> String {
    "sqlite://./data/cadence.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout_secs() -> u64 {
    30
}

fn default_per_page() -> u32 {
    50
}

fn default_max_per_page() -> u32 {
    500
}

fn default_expression_cache_size() -> usize {
    128
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = StorageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_per_page, 500);
        assert_eq!(config.busy_timeout(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cadence.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "database_url = \"sqlite://music.db\"").unwrap();
        writeln!(file, "max_per_page = 100").unwrap();
        writeln!(file, "default_per_page = 25").unwrap();

        let config = StorageConfig::load_from(&path).unwrap();

        assert_eq!(config.database_url, "sqlite://music.db");
        assert_eq!(config.max_per_page, 100);
        assert_eq!(config.default_per_page, 25);
        assert_eq!(config.expression_cache_size, 128);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn inverted_page_limits_are_rejected() {
        let config = StorageConfig {
            default_per_page: 600,
            ..StorageConfig::default()
        };
        assert!(matches!(config.validate(), Err(StorageError::Config(_))));
    }

    #[test]
    fn zero_cache_is_rejected() {
        let config = StorageConfig {
            expression_cache_size: 0,
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
