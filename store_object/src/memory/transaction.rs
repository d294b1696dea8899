use super::database::{FailurePoint, MemoryDatabase, Tables};
use crate::errors::StoreError;
use crate::traits::{TransactionHandle, TransactionManager};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedMutexGuard, OwnedSemaphorePermit};
use uuid::Uuid;

/// Everything a live transaction owns; dropping it releases locks and the connection
pub(crate) struct TxState {
    pub(crate) staged: Tables,
    pub(crate) items_inserted: usize,
    locks: HashMap<Uuid, OwnedMutexGuard<()>>,
    _permit: Option<OwnedSemaphorePermit>,
}

struct MemoryTransactionInner {
    id: u64,
    db: MemoryDatabase,
    state: Mutex<Option<TxState>>,
    finished: AtomicBool,
}

impl Drop for MemoryTransactionInner {
    fn drop(&mut self) {
        if let Some(state) = self.state.get_mut().take() {
            release(&self.db, state);
            tracing::debug!(tx_id = self.id, "transaction dropped while open, rolled back");
            self.db.record_rollback();
        }
    }
}

/// Drop `state`, then forget the row locks nobody else is using
fn release(db: &MemoryDatabase, state: TxState) {
    let rows: Vec<Uuid> = state.locks.keys().copied().collect();
    drop(state);
    db.prune_row_locks(rows);
}

/// Shared handle over one memory-engine transaction
#[derive(Clone)]
pub struct MemoryTransaction {
    inner: Arc<MemoryTransactionInner>,
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("id", &self.inner.id)
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl MemoryTransaction {
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub(crate) fn database(&self) -> &MemoryDatabase {
        &self.inner.db
    }

    /// Run `f` against the staged writes
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut TxState) -> R) -> Result<R, StoreError> {
        let mut state = self.inner.state.lock();
        let state = state.as_mut().ok_or(StoreError::TransactionClosed)?;
        Ok(f(state))
    }

    /// Block until the row lock for `id` is held by this transaction
    pub(crate) async fn lock_row(&self, id: Uuid) -> Result<(), StoreError> {
        if self.with_state(|state| state.locks.contains_key(&id))? {
            return Ok(());
        }

        let row_lock = self.inner.db.row_lock(id);
        let guard = row_lock.lock_owned().await;
        tracing::trace!(tx_id = self.inner.id, row = %id, "row lock acquired");
        self.with_state(move |state| {
            state.locks.insert(id, guard);
        })
    }

    fn take_state(&self) -> Option<TxState> {
        let state = self.inner.state.lock().take();
        if state.is_some() {
            self.inner.finished.store(true, Ordering::SeqCst);
        }
        state
    }
}

#[async_trait]
impl TransactionHandle for MemoryTransaction {
    async fn commit(&self) -> Result<(), StoreError> {
        let Some(state) = self.take_state() else {
            tracing::trace!(tx_id = self.inner.id, "commit on finished transaction ignored");
            return Ok(());
        };
        let db = &self.inner.db;
        db.simulate_io().await;

        if let Err(e) = db.check_fault(FailurePoint::Commit) {
            release(db, state);
            db.record_rollback();
            return Err(e);
        }

        let TxState { staged, locks, .. } = state;
        let rows: Vec<Uuid> = locks.keys().copied().collect();
        db.inner.tables.write().apply(staged);
        db.record_commit();
        // released only after the writes are visible
        drop(locks);
        db.prune_row_locks(rows);
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        let Some(state) = self.take_state() else {
            tracing::trace!(tx_id = self.inner.id, "rollback on finished transaction ignored");
            return Ok(());
        };
        let db = &self.inner.db;
        release(db, state);
        db.record_rollback();
        db.check_fault(FailurePoint::Rollback)
    }

    fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::SeqCst)
    }
}

/// Opens [`MemoryTransaction`]s, waiting for a free connection when the
/// database has a pool limit
#[derive(Clone, Debug)]
pub struct MemoryTransactionManager {
    db: MemoryDatabase,
}

impl MemoryTransactionManager {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionManager for MemoryTransactionManager {
    type Handle = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, StoreError> {
        self.db.check_fault(FailurePoint::Begin)?;

        let permit = match &self.db.inner.pool {
            Some(limit) => {
                let acquire = limit.permits.clone().acquire_owned();
                match tokio::time::timeout(limit.acquire_timeout, acquire).await {
                    Ok(Ok(permit)) => Some(permit),
                    Ok(Err(_)) => {
                        return Err(StoreError::database_operation(
                            "transaction",
                            "begin",
                            sqlx::Error::PoolClosed,
                        ));
                    }
                    Err(_) => {
                        return Err(StoreError::database_operation(
                            "transaction",
                            "begin",
                            sqlx::Error::PoolTimedOut,
                        ));
                    }
                }
            }
            None => None,
        };

        let id = self.db.next_tx_id();
        tracing::trace!(tx_id = id, "transaction started");
        Ok(MemoryTransaction {
            inner: Arc::new(MemoryTransactionInner {
                id,
                db: self.db.clone(),
                state: Mutex::new(Some(TxState {
                    staged: Tables::default(),
                    items_inserted: 0,
                    locks: HashMap::new(),
                    _permit: permit,
                })),
                finished: AtomicBool::new(false),
            }),
        })
    }
}
