use super::database::{MemoryDatabase, Tables};
use super::transaction::{MemoryTransaction, TxState};
use crate::errors::StoreError;

/// Executor shared by every memory store: reads see the bound transaction's
/// own writes before committed rows, writes are staged until commit
#[derive(Clone)]
pub struct MemorySession {
    db: MemoryDatabase,
    tx: Option<MemoryTransaction>,
}

impl std::fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySession")
            .field("tx", &self.tx.as_ref().map(|tx| tx.id()))
            .finish()
    }
}

impl MemorySession {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db, tx: None }
    }

    pub fn bind(&self, tx: &MemoryTransaction) -> Self {
        Self {
            db: tx.database().clone(),
            tx: Some(tx.clone()),
        }
    }

    pub fn database(&self) -> &MemoryDatabase {
        &self.db
    }

    pub(crate) fn transaction(&self) -> Option<&MemoryTransaction> {
        self.tx.as_ref()
    }

    pub(crate) async fn statement(&self) {
        if self.tx.is_some() {
            self.db.simulate_io().await;
        }
    }

    /// Read committed rows, overlaid with the bound transaction's staged rows
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Tables, Option<&Tables>) -> R) -> Result<R, StoreError> {
        match &self.tx {
            Some(tx) => tx.with_state(|state| {
                let committed = self.db.inner.tables.read();
                f(&committed, Some(&state.staged))
            }),
            None => Ok(f(&self.db.inner.tables.read(), None)),
        }
    }

    /// Write into the bound transaction's staging area, or straight into
    /// committed rows without one
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> Result<R, StoreError> {
        match &self.tx {
            Some(tx) => tx.with_state(|state| f(&mut state.staged)),
            None => Ok(f(&mut self.db.inner.tables.write())),
        }
    }

    pub(crate) fn with_tx_state<R>(&self, f: impl FnOnce(Option<&mut TxState>) -> R) -> Result<R, StoreError> {
        match &self.tx {
            Some(tx) => tx.with_state(|state| f(Some(state))),
            None => Ok(f(None)),
        }
    }
}
