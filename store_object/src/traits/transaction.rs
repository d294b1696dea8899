//! Unit-of-work contracts
//!
//! A [`TransactionManager`] opens one [`TransactionHandle`] per unit of work.
//! Repositories implementing [`WithTransaction`] hand out a copy of themselves
//! that routes every read and write through that handle instead of the
//! ambient pool, so several repositories commit or roll back together.

use crate::errors::StoreError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Capability handle bound to one open database transaction
///
/// Handles are cheap to clone and every clone refers to the same transaction.
/// Once `commit` or `rollback` has run, further calls to either are accepted
/// as no-ops. Dropping the last clone of an unfinished handle rolls the
/// transaction back.
#[async_trait]
pub trait TransactionHandle: Clone + Send + Sync + Debug + 'static {
    /// Make every write performed through this handle durable
    ///
    /// When this returns an error the store guarantees nothing was applied.
    async fn commit(&self) -> Result<(), StoreError>;

    /// Discard every write performed through this handle
    async fn rollback(&self) -> Result<(), StoreError>;

    /// True once commit or rollback has been attempted
    fn is_finished(&self) -> bool;
}

/// Opens transactions against the underlying connection pool
#[async_trait]
pub trait TransactionManager: Send + Sync + Debug {
    type Handle: TransactionHandle;

    /// Open a new transaction
    ///
    /// Fails when no connection can be obtained within the pool's wait policy.
    async fn begin(&self) -> Result<Self::Handle, StoreError>;
}

/// Bind a repository to a transaction
///
/// Binding never touches the database and never opens a transaction; the
/// original, pool-backed repository stays usable.
pub trait WithTransaction<H: TransactionHandle>: Sized {
    fn with_tx(&self, tx: &H) -> Self;
}
