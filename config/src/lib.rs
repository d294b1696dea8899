//! # Configuration Management for Shopkeep
//!
//! This crate provides centralized configuration structures for all Shopkeep components,
//! including the database pool, the order workflow and logging.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{DatabaseConfig, WorkflowConfig};
//!
//! let db_config = DatabaseConfig::new(
//!     "localhost".to_string(), 5432, "shopkeep".to_string(),
//!     "postgres".to_string(), "password".to_string(),
//!     5, 50, 5, 120, 300,
//! );
//!
//! let workflow = WorkflowConfig::default().with_timeout_ms(2_000);
//! assert!(workflow.lock_products);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! host = "localhost"
//! port = 5432
//! database = "shopkeep"
//! username = "postgres"
//! password = "password"
//! ssl_mode = "disable"
//! min_connections = 5
//! max_connections = 50
//! connection_timeout_seconds = 5
//! idle_timeout_seconds = 120
//! max_lifetime_seconds = 300
//!
//! [workflow]
//! timeout_ms = 5000
//! lock_products = true
//!
//! [logging]
//! filter = "info,shopkeep=debug"
//! ansi = true
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from shopkeep.toml (or the path in SHOPKEEP_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./shopkeep.toml";
const CONFIG_PATH_VAR: &str = "SHOPKEEP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection and pool configuration
///
/// `max_connections` bounds the number of concurrently open connections.
/// `min_connections` is the idle floor the pool keeps warm; connections above it
/// are closed after `idle_timeout_seconds` and every connection is recycled after
/// `max_lifetime_seconds`. A caller that cannot acquire a connection within
/// `connection_timeout_seconds` gets an error instead of waiting forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: u64,
}

/// Order workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Deadline for the transactional part of an order creation, in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Take a row lock on every product read inside the workflow
    #[serde(default = "default_lock_products")]
    pub lock_products: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_min_connections() -> u32 {
    5
}

fn default_max_connections() -> u32 {
    50
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    120
}

fn default_max_lifetime() -> u64 {
    300
}

fn default_lock_products() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from the TOML file named in the environment (or `.env`),
    /// falling back to `./shopkeep.toml`
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine, a malformed one is not
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified as {} (environment or .env) or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;

        if let Some(0) = self.workflow.timeout_ms {
            return Err(ConfigError::Invalid(
                "Workflow timeout_ms must be greater than 0 when set".to_string(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Logging filter cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
        min_connections: u32,
        max_connections: u32,
        connection_timeout_seconds: u64,
        idle_timeout_seconds: u64,
        max_lifetime_seconds: u64,
    ) -> Self {
        Self {
            host,
            port,
            database,
            username,
            password,
            ssl_mode: default_ssl_mode(),
            min_connections,
            max_connections,
            connection_timeout_seconds,
            idle_timeout_seconds,
            max_lifetime_seconds,
        }
    }

    /// Build a configuration from `DB_*` environment variables, with pool defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_or("DB_PORT", "5432")
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid(format!("DB_PORT is not a valid port: {}", e)))?;

        let mut config = Self::new(
            env_or("DB_HOST", "localhost"),
            port,
            env_or("DB_NAME", "shopkeep"),
            env_or("DB_USER", "postgres"),
            env_or("DB_PASSWORD", ""),
            default_min_connections(),
            default_max_connections(),
            default_connection_timeout(),
            default_idle_timeout(),
            default_max_lifetime(),
        );
        config.ssl_mode = env_or("DB_SSLMODE", "disable");

        config.validate()?;
        Ok(config)
    }

    /// Build connection string
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}?sslmode={}",
            self.username, self.password, self.host, self.port, self.database, self.ssl_mode
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid(
                "Database host cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid(
                "Database port cannot be zero".to_string(),
            ));
        }
        if self.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Invalid(
                "Database username cannot be empty".to_string(),
            ));
        }
        if self.min_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database min_connections must be greater than 0".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Database connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl WorkflowConfig {
    pub fn new(timeout_ms: Option<u64>, lock_products: bool) -> Self {
        Self {
            timeout_ms,
            lock_products,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_lock_products(mut self, lock_products: bool) -> Self {
        self.lock_products = lock_products;
        self
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            lock_products: default_lock_products(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            ansi: default_ansi(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
