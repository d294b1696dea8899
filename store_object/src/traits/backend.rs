use super::core::{CustomerRepository, OrderItemRepository, OrderRepository, ProductRepository};
use super::transaction::{TransactionHandle, TransactionManager, WithTransaction};

/// Ties one storage engine's transaction handle to its manager and repositories
pub trait StoreBackend: Send + Sync + 'static {
    type Tx: TransactionHandle;
    type Manager: TransactionManager<Handle = Self::Tx> + 'static;
    type Customers: CustomerRepository + WithTransaction<Self::Tx> + 'static;
    type Products: ProductRepository + WithTransaction<Self::Tx> + 'static;
    type Orders: OrderRepository + WithTransaction<Self::Tx> + 'static;
    type OrderItems: OrderItemRepository + WithTransaction<Self::Tx> + 'static;
}

/// The four repositories taking part in an order unit of work
pub struct Repositories<B: StoreBackend> {
    pub customers: B::Customers,
    pub products: B::Products,
    pub orders: B::Orders,
    pub order_items: B::OrderItems,
}

impl<B: StoreBackend> Repositories<B> {
    pub fn new(
        customers: B::Customers,
        products: B::Products,
        orders: B::Orders,
        order_items: B::OrderItems,
    ) -> Self {
        Self {
            customers,
            products,
            orders,
            order_items,
        }
    }

    /// Bind all four repositories to the same transaction
    pub fn with_tx(&self, tx: &B::Tx) -> Self {
        Self {
            customers: self.customers.with_tx(tx),
            products: self.products.with_tx(tx),
            orders: self.orders.with_tx(tx),
            order_items: self.order_items.with_tx(tx),
        }
    }
}

impl<B: StoreBackend> Clone for Repositories<B> {
    fn clone(&self) -> Self {
        Self {
            customers: self.customers.clone(),
            products: self.products.clone(),
            orders: self.orders.clone(),
            order_items: self.order_items.clone(),
        }
    }
}

impl<B: StoreBackend> std::fmt::Debug for Repositories<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("customers", &self.customers)
            .field("products", &self.products)
            .field("orders", &self.orders)
            .field("order_items", &self.order_items)
            .finish()
    }
}
