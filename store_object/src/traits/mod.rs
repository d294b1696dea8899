//! Traits for database operations
//!
//! This module contains the repository contracts, the unit-of-work contracts
//! and the [`StoreBackend`] tying one engine's implementations together.

pub mod backend;
pub mod core;
pub mod transaction;

// Re-export all public items for convenience
pub use backend::{Repositories, StoreBackend};
pub use core::{
    clamp_page, CustomerRepository, OrderItemRepository, OrderRepository, ProductRepository,
};
pub use transaction::{TransactionHandle, TransactionManager, WithTransaction};
