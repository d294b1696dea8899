//! # Shopkeep
//!
//! Order-fulfillment persistence core for PostgreSQL: repositories that can be
//! bound to one transaction, and an all-or-nothing order creation workflow
//! built on them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shopkeep::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     setup_tracing(&config.logging);
//!
//!     let shopkeep = Shopkeep::new(config.database).await?;
//!     shopkeep.migrate(false).await?;
//!
//!     let repos = shopkeep.repositories();
//!     let customer = repos
//!         .customers
//!         .create(NewCustomer::new("Ada", "Lovelace", "ada@example.com"))
//!         .await?;
//!     let desk = repos.products.create(NewProduct::new("Desk", 50_000, 10)).await?;
//!
//!     let orders = shopkeep.order_service(config.workflow, None);
//!     let order = orders
//!         .create_order(CreateOrderRequest::new(
//!             customer.id,
//!             vec![OrderLine::new(desk.id, 2)],
//!         ))
//!         .await?;
//!     println!("Created order {} for {} cents", order.id, order.total_cents);
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod migration;
pub mod order;
pub mod prelude;
pub mod telemetry;

// Re-export the main public types for convenience
pub use core::Shopkeep;
pub use errors::ShopkeepError;
pub use order::{CreateOrderRequest, OrderError, OrderErrorKind, OrderLine, OrderService};
pub use telemetry::setup_tracing;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, LoggingConfig, WorkflowConfig};

// Re-export internal crates used by the public API
pub use signal_system;
pub use store_object;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
