//! Entity models persisted by the stores
//!
//! Rows are decoded with `sqlx::FromRow`; the `New*` payloads carry only the
//! columns the caller supplies, the store generates ids and timestamps.

pub mod customer;
pub mod order;
pub mod product;

pub use customer::{Customer, NewCustomer};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};
pub use product::{NewProduct, Product};
