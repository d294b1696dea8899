//! In-process storage engine
//!
//! Implements the same repository and transaction contracts as the
//! PostgreSQL stores with read-committed isolation, product row locks held
//! until the owning transaction ends, an optional bounded connection pool, and
//! injectable faults for exercising failure paths.
//!
//! Two transactions locking the same pair of products in opposite orders
//! wait on each other forever here; PostgreSQL would abort one of them.
//! Set `WorkflowConfig::timeout_ms` to bound the wait: the order workflow
//! then rolls back with `DeadlineExceeded`, releasing its locks.

pub mod database;
pub mod session;
pub mod stores;
pub mod transaction;

pub use database::{FailurePoint, MemoryDatabase};
pub use session::MemorySession;
pub use stores::{MemoryCustomerStore, MemoryOrderItemStore, MemoryOrderStore, MemoryProductStore};
pub use transaction::{MemoryTransaction, MemoryTransactionManager};

use crate::traits::{Repositories, StoreBackend};

/// Memory storage engine
#[derive(Debug, Clone, Copy)]
pub struct MemoryBackend;

impl StoreBackend for MemoryBackend {
    type Tx = MemoryTransaction;
    type Manager = MemoryTransactionManager;
    type Customers = MemoryCustomerStore;
    type Products = MemoryProductStore;
    type Orders = MemoryOrderStore;
    type OrderItems = MemoryOrderItemStore;
}

impl MemoryBackend {
    pub fn transaction_manager(db: &MemoryDatabase) -> MemoryTransactionManager {
        MemoryTransactionManager::new(db.clone())
    }

    pub fn repositories(db: &MemoryDatabase) -> Repositories<MemoryBackend> {
        Repositories::new(
            MemoryCustomerStore::new(db.clone()),
            MemoryProductStore::new(db.clone()),
            MemoryOrderStore::new(db.clone()),
            MemoryOrderItemStore::new(db.clone()),
        )
    }
}
