use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::common::RetryConfig;
use database::postgres::PostgresConfig;
use std::time::Duration;
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Value of `STORAGE_BACKEND`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Where the repositories keep their data
#[derive(Clone, Debug)]
pub enum StorageConfig {
    Postgres {
        database: PostgresConfig,
        /// Apply pending migrations at startup (`DB_RUN_MIGRATIONS`)
        run_migrations: bool,
        /// Backoff for the startup connection
        connect_retry: RetryConfig,
    },
    /// Process-local maps, lost on shutdown
    Memory,
}

impl StorageConfig {
    pub fn backend(&self) -> StorageBackend {
        match self {
            StorageConfig::Postgres { .. } => StorageBackend::Postgres,
            StorageConfig::Memory => StorageBackend::Memory,
        }
    }
}

impl FromEnv for StorageConfig {
    /// - STORAGE_BACKEND: `postgres` (default) or `memory`
    /// - DB_RUN_MIGRATIONS: defaults to true
    /// - DB_CONNECT_MAX_RETRIES (5), DB_CONNECT_MAX_DELAY_MS (5000)
    /// - DATABASE_URL and the `DB_*` pool settings for `postgres`
    fn from_env() -> Result<Self, ConfigError> {
        match env_parse_or("STORAGE_BACKEND", StorageBackend::Postgres)? {
            StorageBackend::Memory => Ok(StorageConfig::Memory),
            StorageBackend::Postgres => Ok(StorageConfig::Postgres {
                database: PostgresConfig::from_env()?,
                run_migrations: env_parse_or("DB_RUN_MIGRATIONS", true)?,
                connect_retry: RetryConfig::new()
                    .with_max_retries(env_parse_or("DB_CONNECT_MAX_RETRIES", 5)?)
                    .with_max_delay(Duration::from_millis(env_parse_or(
                        "DB_CONNECT_MAX_DELAY_MS",
                        5000,
                    )?)),
            }),
        }
    }
}

/// Application configuration composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let storage = StorageConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            storage,
        })
    }

    /// Development settings over in-memory storage
    pub fn in_memory() -> Self {
        Self {
            app: app_info!(),
            environment: Environment::Development,
            server: ServerConfig::default(),
            storage: StorageConfig::Memory,
        }
    }
}
