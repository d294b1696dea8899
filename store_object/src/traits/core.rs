//! Repository trait definitions
//!
//! One trait per aggregate. Implementations are small values holding a pool and
//! an optional transaction handle; see [`WithTransaction`](super::WithTransaction).

use crate::errors::StoreError;
use crate::models::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, Product,
};
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

#[async_trait]
pub trait CustomerRepository: Clone + Send + Sync + Debug {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Customer>, StoreError>;
}

#[async_trait]
pub trait ProductRepository: Clone + Send + Sync + Debug {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    /// Read a product and lock its row until the bound transaction ends
    ///
    /// Without a bound transaction this is a plain read.
    async fn find_by_id_for_update(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    /// Newest first, `limit` clamped to 1..=100
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>, StoreError>;

    /// Persist name, description, price and stock; negative stock is rejected
    /// before anything is written
    async fn update(&self, product: &Product) -> Result<Product, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait OrderRepository: Clone + Send + Sync + Debug {
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Order with its items
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// All orders with their items, newest first
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    async fn count_by_customer(&self, customer_id: Uuid) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait OrderItemRepository: Clone + Send + Sync + Debug {
    async fn create(&self, item: NewOrderItem) -> Result<OrderItem, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderItem>, StoreError>;

    async fn list_by_order(&self, order_id: Uuid) -> Result<Vec<OrderItem>, StoreError>;
}

/// Clamp pagination input the way every product listing does
pub fn clamp_page(limit: i64, offset: i64) -> (i64, i64) {
    let limit = if limit <= 0 { 50 } else { limit.min(100) };
    (limit, offset.max(0))
}

#[cfg(test)]
mod tests {
    use super::clamp_page;

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 0), (50, 0));
        assert_eq!(clamp_page(500, -4), (100, 0));
        assert_eq!(clamp_page(20, 40), (20, 40));
    }
}
