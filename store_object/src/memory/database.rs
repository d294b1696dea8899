use crate::errors::StoreError;
use crate::models::{Customer, Order, OrderItem, Product};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Barrier, Semaphore};
use uuid::Uuid;

/// Injectable fault, armed with [`MemoryDatabase::fail_on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    Begin,
    CustomerRead,
    ProductRead,
    ProductUpdate,
    OrderInsert,
    /// Fail the order-item insert issued after `after` successful ones in the same transaction
    OrderItemInsert { after: usize },
    /// Commit fails; the engine discards the transaction's writes
    Commit,
    /// Rollback reports an error; the writes are discarded anyway
    Rollback,
}

impl FailurePoint {
    pub(crate) fn message(&self) -> String {
        match self {
            FailurePoint::Begin => "injected begin failure".to_string(),
            FailurePoint::CustomerRead => "injected customer read failure".to_string(),
            FailurePoint::ProductRead => "injected product read failure".to_string(),
            FailurePoint::ProductUpdate => "injected product update failure".to_string(),
            FailurePoint::OrderInsert => "injected order insert failure".to_string(),
            FailurePoint::OrderItemInsert { after } => {
                format!("injected order item insert failure after {} rows", after)
            }
            FailurePoint::Commit => "injected commit failure".to_string(),
            FailurePoint::Rollback => "injected rollback failure".to_string(),
        }
    }
}

/// Row storage, used both for committed data and for a transaction's staged writes
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) customers: HashMap<Uuid, Customer>,
    pub(crate) products: HashMap<Uuid, Product>,
    pub(crate) deleted_products: HashSet<Uuid>,
    pub(crate) orders: Vec<Order>,
    pub(crate) order_items: Vec<OrderItem>,
}

impl Tables {
    pub(crate) fn apply(&mut self, staged: Tables) {
        for id in staged.deleted_products {
            self.products.remove(&id);
        }
        self.customers.extend(staged.customers);
        self.products.extend(staged.products);
        self.orders.extend(staged.orders);
        self.order_items.extend(staged.order_items);
    }
}

pub(crate) struct PoolLimit {
    pub(crate) permits: Arc<Semaphore>,
    pub(crate) acquire_timeout: Duration,
}

pub(crate) struct DatabaseInner {
    pub(crate) tables: RwLock<Tables>,
    row_locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
    faults: Mutex<HashSet<FailurePoint>>,
    pub(crate) pool: Option<PoolLimit>,
    latency: Mutex<Option<Duration>>,
    read_barrier: Mutex<Option<Arc<Barrier>>>,
    next_tx_id: AtomicU64,
    commits: AtomicU64,
    rollbacks: AtomicU64,
}

/// In-process relational engine with read-committed transactions
///
/// Transactions stage their writes and read their own writes first, then
/// committed data. Commit applies the staged writes atomically; rollback,
/// a failed commit, or dropping the last handle discards them. Product rows
/// can be locked until the owning transaction ends.
#[derive(Clone)]
pub struct MemoryDatabase {
    pub(crate) inner: Arc<DatabaseInner>,
}

impl std::fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("commits", &self.commit_count())
            .field("rollbacks", &self.rollback_count())
            .finish()
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Engine whose transactions each hold one of `max_transactions` connections;
    /// `begin` gives up after `acquire_timeout`
    pub fn with_pool_limit(max_transactions: usize, acquire_timeout: Duration) -> Self {
        Self::build(Some(PoolLimit {
            permits: Arc::new(Semaphore::new(max_transactions)),
            acquire_timeout,
        }))
    }

    fn build(pool: Option<PoolLimit>) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                tables: RwLock::new(Tables::default()),
                row_locks: Mutex::new(HashMap::new()),
                faults: Mutex::new(HashSet::new()),
                pool,
                latency: Mutex::new(None),
                read_barrier: Mutex::new(None),
                next_tx_id: AtomicU64::new(1),
                commits: AtomicU64::new(0),
                rollbacks: AtomicU64::new(0),
            }),
        }
    }

    /// Arm a fault; it stays armed until [`clear_faults`](Self::clear_faults)
    pub fn fail_on(&self, point: FailurePoint) {
        self.inner.faults.lock().insert(point);
    }

    pub fn clear_faults(&self) {
        self.inner.faults.lock().clear();
    }

    /// Delay every transactional statement, to stand in for network round trips
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.inner.latency.lock() = latency;
    }

    /// Make every transactional product read wait on `barrier` after reading
    pub fn set_product_read_barrier(&self, barrier: Option<Arc<Barrier>>) {
        *self.inner.read_barrier.lock() = barrier;
    }

    /// Committed product row
    pub fn committed_product(&self, id: Uuid) -> Option<Product> {
        self.inner.tables.read().products.get(&id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.inner.tables.read().orders.len()
    }

    pub fn order_item_count(&self) -> usize {
        self.inner.tables.read().order_items.len()
    }

    pub fn commit_count(&self) -> u64 {
        self.inner.commits.load(Ordering::Relaxed)
    }

    pub fn rollback_count(&self) -> u64 {
        self.inner.rollbacks.load(Ordering::Relaxed)
    }

    pub(crate) fn check_fault(&self, point: FailurePoint) -> Result<(), StoreError> {
        if self.inner.faults.lock().contains(&point) {
            return Err(StoreError::Backend(point.message()));
        }
        Ok(())
    }

    pub(crate) fn row_lock(&self, id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        self.inner
            .row_locks
            .lock()
            .entry(id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Forget lock entries no transaction holds or waits on
    pub(crate) fn prune_row_locks(&self, ids: impl IntoIterator<Item = Uuid>) {
        let mut row_locks = self.inner.row_locks.lock();
        for id in ids {
            if row_locks.get(&id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                row_locks.remove(&id);
            }
        }
    }

    pub(crate) fn row_lock_count(&self) -> usize {
        self.inner.row_locks.lock().len()
    }

    pub(crate) async fn simulate_io(&self) {
        let latency = *self.inner.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub(crate) async fn product_read_barrier(&self) {
        let barrier = self.inner.read_barrier.lock().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }

    pub(crate) fn next_tx_id(&self) -> u64 {
        self.inner.next_tx_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn record_commit(&self) {
        self.inner.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rollback(&self) {
        self.inner.rollbacks.fetch_add(1, Ordering::Relaxed);
    }
}
