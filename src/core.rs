//! Core Shopkeep functionality
//!
//! This module contains the main Shopkeep struct and its implementation,
//! owning the bounded connection pool and handing out repositories,
//! transaction managers and order services built on it.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use store_object::pg_store::PgTransactionManager;
use store_object::{PgBackend, Repositories};

use crate::errors::ShopkeepError;
use crate::order::OrderService;
use config::{DatabaseConfig, WorkflowConfig};
use signal_system::SignalManager;

/// Main Shopkeep coordinator that manages the database connection pool
#[derive(Clone, Debug)]
pub struct Shopkeep {
    pool: PgPool,
}

impl Shopkeep {
    /// Create new Shopkeep with a bounded database pool
    ///
    /// A caller waiting longer than `connection_timeout_seconds` for a
    /// connection gets an error instead of blocking.
    pub async fn new(config: DatabaseConfig) -> Result<Self, ShopkeepError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "database pool ready"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Pool-backed repositories
    pub fn repositories(&self) -> Repositories<PgBackend> {
        PgBackend::repositories(&self.pool)
    }

    pub fn transaction_manager(&self) -> PgTransactionManager {
        PgBackend::transaction_manager(&self.pool)
    }

    /// Order service running on this pool
    pub fn order_service(
        &self,
        config: WorkflowConfig,
        signals: Option<Arc<SignalManager>>,
    ) -> OrderService<PgBackend> {
        let service = OrderService::new(self.transaction_manager(), self.repositories(), config);
        match signals {
            Some(signals) => service.with_signals(signals),
            None => service,
        }
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), ShopkeepError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
