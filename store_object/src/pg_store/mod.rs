//! PostgreSQL store implementations
//!
//! Every store wraps a [`PgSession`]: pool-backed by default, transaction-bound
//! after `with_tx`.

pub mod customer;
pub mod order;
pub mod order_item;
pub mod product;
pub mod session;
pub mod transaction;

pub use customer::PgCustomerStore;
pub use order::PgOrderStore;
pub use order_item::PgOrderItemStore;
pub use product::PgProductStore;
pub use session::PgSession;
pub use transaction::{PgTransaction, PgTransactionManager};

use crate::traits::{Repositories, StoreBackend};
use sqlx::PgPool;

/// PostgreSQL storage engine
#[derive(Debug, Clone, Copy)]
pub struct PgBackend;

impl StoreBackend for PgBackend {
    type Tx = PgTransaction;
    type Manager = PgTransactionManager;
    type Customers = PgCustomerStore;
    type Products = PgProductStore;
    type Orders = PgOrderStore;
    type OrderItems = PgOrderItemStore;
}

impl PgBackend {
    pub fn transaction_manager(pool: &PgPool) -> PgTransactionManager {
        PgTransactionManager::new(pool.clone())
    }

    pub fn repositories(pool: &PgPool) -> Repositories<PgBackend> {
        Repositories::new(
            PgCustomerStore::new(pool.clone()),
            PgProductStore::new(pool.clone()),
            PgOrderStore::new(pool.clone()),
            PgOrderItemStore::new(pool.clone()),
        )
    }
}
