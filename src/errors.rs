//! Error types for the Shopkeep crate
//!
//! This module contains the bootstrap and migration errors. Workflow errors
//! live in [`crate::order::OrderError`].

use config::ConfigError;
use store_object::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopkeepError {
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
