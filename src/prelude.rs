//! Convenience re-exports for common Shopkeep usage
//!
//! This prelude module re-exports the most commonly used items from the
//! Shopkeep workspace, making it easier to import everything you need with a
//! single use statement.
//!
//! # Example
//!
//! ```rust
//! use shopkeep::prelude::*;
//!
//! // Now you have access to the coordinator, the order workflow and the repositories
//! ```

// Core Shopkeep components
pub use crate::core::Shopkeep;
pub use crate::errors::ShopkeepError;
pub use crate::migration;
pub use crate::order::{CreateOrderRequest, OrderError, OrderErrorKind, OrderLine, OrderService};
pub use crate::telemetry::setup_tracing;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, LoggingConfig, WorkflowConfig};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Re-export store_object module
pub use store_object;

// Re-export signal system for event handling
pub use signal_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use sqlx;
pub use tokio;
