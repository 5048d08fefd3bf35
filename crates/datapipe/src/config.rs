//! Configuration management
//!
//! Values come from the process environment (after loading `.env` through
//! `dotenvy`) with the `DEFAULT_*` constants below as fallbacks. Command line
//! flags override individual values after loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::db::DbConfig;
use crate::storage::StorageConfig;

// ============================================================================
// Pool Keys
// ============================================================================

/// Key of the Postgres pool holding bookkeeping and partner tables.
pub const DEFAULT_DATAPIPE_POOL_KEY: &str = "datapipe";

/// Key of the search cluster client.
pub const DEFAULT_SEARCH_POOL_KEY: &str = "search";

// ============================================================================
// Search Cluster
// ============================================================================

/// Default search cluster endpoint for local development.
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:9200";

/// Default timeout of a single search cluster request in seconds.
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Ingest
// ============================================================================

/// Default number of records committed per transaction.
pub const DEFAULT_INGEST_BATCH_SIZE: usize = 1000;

/// Default number of priority groups dispatched at the same time.
pub const DEFAULT_INGEST_FILE_BUFFER_SIZE: usize = 1;

// ============================================================================
// Indexer
// ============================================================================

pub const DEFAULT_INDEX_ALIAS: &str = "addresses";

/// Default page size when reading addresses.
pub const DEFAULT_INDEX_BATCH_SIZE: usize = 1000;

/// Smallest accepted page size.
pub const MIN_INDEX_BATCH_SIZE: usize = 100;

/// FIPS processed successfully within this window are skipped.
pub const DEFAULT_INDEX_RECENCY_WINDOW_HOURS: i64 = 24;

/// Default number of FIPS indexed concurrently.
pub const DEFAULT_INDEX_OUTER_PARALLELISM: usize = 4;

/// Default number of bulk requests in flight per FIPS.
pub const DEFAULT_INDEX_INNER_PARALLELISM: usize = 10;

/// Default attempts for a rate limited bulk request.
pub const DEFAULT_INDEX_MAX_RETRIES: u32 = 5;

pub const DEFAULT_INDEX_RETRY_BASE_MS: u64 = 1000;

pub const DEFAULT_INDEX_RETRY_CAP_MS: u64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DbConfig,
    pub pool_keys: PoolKeys,
    pub search: SearchConfig,
    pub ingest: IngestConfig,
    pub storage: StorageConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolKeys {
    pub datapipe: String,
    pub search: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub url: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub file_buffer_size: usize,
    /// Walk root, defaults to the partner's own root
    pub root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub alias: String,
    pub batch_size: usize,
    pub zip5: Option<String>,
    pub fips: Option<String>,
    pub recency_window_hours: i64,
    pub outer_parallelism: usize,
    pub inner_parallelism: usize,
    pub max_retries: u32,
    pub retry_base_ms: u64,
    pub retry_cap_ms: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            database: DbConfig::from_env()?,
            pool_keys: PoolKeys {
                datapipe: env_opt("DATAPIPE_POOL_KEY")
                    .unwrap_or_else(|| DEFAULT_DATAPIPE_POOL_KEY.to_string()),
                search: env_opt("SEARCH_POOL_KEY")
                    .unwrap_or_else(|| DEFAULT_SEARCH_POOL_KEY.to_string()),
            },
            search: SearchConfig {
                url: env_opt("SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
                username: env_opt("SEARCH_USERNAME"),
                password: env_opt("SEARCH_PASSWORD"),
                timeout_secs: env_or("SEARCH_TIMEOUT", DEFAULT_SEARCH_TIMEOUT_SECS),
            },
            ingest: IngestConfig {
                batch_size: env_or("INGEST_BATCH_SIZE", DEFAULT_INGEST_BATCH_SIZE),
                file_buffer_size: env_or("INGEST_FILE_BUFFER_SIZE", DEFAULT_INGEST_FILE_BUFFER_SIZE),
                root: env_opt("INGEST_ROOT"),
            },
            storage: StorageConfig::from_env()?,
            index: IndexConfig {
                alias: env_opt("INDEX_ALIAS").unwrap_or_else(|| DEFAULT_INDEX_ALIAS.to_string()),
                batch_size: env_or("INDEX_BATCH_SIZE", DEFAULT_INDEX_BATCH_SIZE),
                zip5: env_opt("INDEX_ZIP5"),
                fips: env_opt("INDEX_FIPS"),
                recency_window_hours: env_or(
                    "INDEX_RECENCY_WINDOW_HOURS",
                    DEFAULT_INDEX_RECENCY_WINDOW_HOURS,
                ),
                outer_parallelism: env_or("INDEX_OUTER_PARALLELISM", DEFAULT_INDEX_OUTER_PARALLELISM),
                inner_parallelism: env_or("INDEX_INNER_PARALLELISM", DEFAULT_INDEX_INNER_PARALLELISM),
                max_retries: env_or("INDEX_MAX_RETRIES", DEFAULT_INDEX_MAX_RETRIES),
                retry_base_ms: env_or("INDEX_RETRY_BASE_MS", DEFAULT_INDEX_RETRY_BASE_MS),
                retry_cap_ms: env_or("INDEX_RETRY_CAP_MS", DEFAULT_INDEX_RETRY_CAP_MS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.pool_keys.datapipe.is_empty() || self.pool_keys.search.is_empty() {
            anyhow::bail!("Pool keys cannot be empty");
        }

        if self.ingest.batch_size == 0 {
            anyhow::bail!("Ingest batch size must be greater than 0");
        }

        if self.ingest.file_buffer_size == 0 {
            anyhow::bail!("Ingest file buffer size must be greater than 0");
        }

        if self.index.batch_size < MIN_INDEX_BATCH_SIZE {
            anyhow::bail!(
                "Index batch size ({}) must be at least {}",
                self.index.batch_size,
                MIN_INDEX_BATCH_SIZE
            );
        }

        if self.index.outer_parallelism == 0 || self.index.inner_parallelism == 0 {
            anyhow::bail!("Index parallelism must be greater than 0");
        }

        if self.index.max_retries == 0 {
            anyhow::bail!("Index max retries must be greater than 0");
        }

        if self.index.alias.is_empty() {
            anyhow::bail!("Index alias cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            pool_keys: PoolKeys {
                datapipe: DEFAULT_DATAPIPE_POOL_KEY.to_string(),
                search: DEFAULT_SEARCH_POOL_KEY.to_string(),
            },
            search: SearchConfig::default(),
            ingest: IngestConfig {
                batch_size: DEFAULT_INGEST_BATCH_SIZE,
                file_buffer_size: DEFAULT_INGEST_FILE_BUFFER_SIZE,
                root: None,
            },
            storage: StorageConfig::Local {
                path: PathBuf::from(crate::storage::DEFAULT_LOCAL_PATH),
            },
            index: IndexConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SEARCH_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            alias: DEFAULT_INDEX_ALIAS.to_string(),
            batch_size: DEFAULT_INDEX_BATCH_SIZE,
            zip5: None,
            fips: None,
            recency_window_hours: DEFAULT_INDEX_RECENCY_WINDOW_HOURS,
            outer_parallelism: DEFAULT_INDEX_OUTER_PARALLELISM,
            inner_parallelism: DEFAULT_INDEX_INNER_PARALLELISM,
            max_retries: DEFAULT_INDEX_MAX_RETRIES,
            retry_base_ms: DEFAULT_INDEX_RETRY_BASE_MS,
            retry_cap_ms: DEFAULT_INDEX_RETRY_CAP_MS,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.index.alias, "addresses");
        assert_eq!(config.index.outer_parallelism, 4);
        assert_eq!(config.index.inner_parallelism, 10);
        assert_eq!(config.ingest.file_buffer_size, 1);
    }

    #[test]
    fn test_small_index_batch_is_rejected() {
        let mut config = Config::default();
        config.index.batch_size = 99;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_reads_environment() {
        std::env::set_var("INDEX_ALIAS", "addr_test");
        std::env::set_var("INDEX_FIPS", "06037");
        std::env::set_var("INGEST_BATCH_SIZE", "250");
        std::env::set_var("STORAGE_BACKEND", "local");

        let config = Config::load().unwrap();
        assert_eq!(config.index.alias, "addr_test");
        assert_eq!(config.index.fips.as_deref(), Some("06037"));
        assert_eq!(config.ingest.batch_size, 250);

        std::env::remove_var("INDEX_ALIAS");
        std::env::remove_var("INDEX_FIPS");
        std::env::remove_var("INGEST_BATCH_SIZE");
        std::env::remove_var("STORAGE_BACKEND");
    }
}
