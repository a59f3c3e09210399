//! Configuration management for the retail reporting dashboard
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with DASHBOARD_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// ERP schema settings
    pub erp: ErpConfig,

    /// Inventory snapshot cache
    pub cache: CacheConfig,

    /// Report defaults
    pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Connection URL of the ERP database
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// How long a request waits for a pooled connection
    pub acquire_timeout_secs: u64,

    /// Server-side limit for a single statement
    pub statement_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ErpConfig {
    /// Schema holding the ERP company tables
    pub schema: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Durable mirror of the inventory snapshot
    pub file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Default window of the daily sales report, in days
    pub daily_default_days: u32,

    /// Default window of the accumulated report, in days
    pub accumulated_default_days: u32,

    /// Upper bound for a manual inventory refresh
    pub refresh_timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("DASHBOARD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3001)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 0)?
            .set_default("database.acquire_timeout_secs", 120)?
            .set_default("database.statement_timeout_secs", 120)?
            .set_default("erp.schema", "SBO_HVGA_PROD")?
            .set_default("cache.file", "inventario_cache.json")?
            .set_default("reports.daily_default_days", 7)?
            .set_default("reports.accumulated_default_days", 30)?
            .set_default("reports.refresh_timeout_secs", 120)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (DASHBOARD_ prefix)
            .add_source(
                Environment::with_prefix("DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration for tests and local tooling: defaults everywhere, with
    /// the snapshot cache stored at `cache_file`.
    pub fn with_cache_file(cache_file: impl Into<PathBuf>) -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
                acquire_timeout_secs: 5,
                statement_timeout_secs: 5,
            },
            erp: ErpConfig::default(),
            cache: CacheConfig {
                file: cache_file.into(),
            },
            reports: ReportsConfig::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

impl ReportsConfig {
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            schema: "SBO_HVGA_PROD".to_string(),
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            daily_default_days: 7,
            accumulated_default_days: 30,
            refresh_timeout_secs: 120,
        }
    }
}
