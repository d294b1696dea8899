//! Convenience re-exports for common store-object usage

// Repository and unit-of-work traits
pub use crate::traits::{
    CustomerRepository, OrderItemRepository, OrderRepository, ProductRepository, Repositories,
    StoreBackend, TransactionHandle, TransactionManager, WithTransaction,
};

// Error types
pub use crate::errors::StoreError;

// Rows
pub use crate::models::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, OrderStatus,
    Product,
};

// Engines
pub use crate::memory::{MemoryBackend, MemoryDatabase};
pub use crate::pg_store::PgBackend;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use sqlx::PgPool;
pub use uuid::Uuid;
