//! Transaction support for the PostgreSQL stores
//!
//! [`PgTransaction`] wraps a sqlx transaction behind a shared handle so that
//! several stores can be bound to it at once. The underlying transaction can
//! be driven directly through `execute` / `fetch_*`.
//!
//! # Example
//! ```ignore
//! let tx = manager.begin().await?;
//!
//! let products = product_store.with_tx(&tx);
//! let orders = order_store.with_tx(&tx);
//! products.update(&product.with_stock(8)?).await?;
//! orders.create(new_order).await?;
//!
//! tx.commit().await?;
//! ```

use crate::errors::StoreError;
use crate::traits::{TransactionHandle, TransactionManager};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

const TX_TABLE: &str = "transaction";

/// Shared handle over one open PostgreSQL transaction
///
/// Dropping the last clone of an unfinished handle drops the sqlx transaction,
/// which rolls it back on its connection.
#[derive(Clone)]
pub struct PgTransaction {
    inner: Arc<PgTransactionInner>,
}

struct PgTransactionInner {
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
    finished: AtomicBool,
}

impl std::fmt::Debug for PgTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransaction")
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn closed() -> sqlx::Error {
    sqlx::Error::Protocol("transaction already committed or rolled back".to_string())
}

impl PgTransaction {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            inner: Arc::new(PgTransactionInner {
                tx: Mutex::new(Some(tx)),
                finished: AtomicBool::new(false),
            }),
        }
    }

    /// Execute a statement inside the transaction
    pub async fn execute<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, sqlx::Error> {
        let mut guard = self.inner.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(closed)?;
        query.execute(&mut **tx).await
    }

    /// Fetch every row produced by the query
    pub async fn fetch_all<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> Result<Vec<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        let mut guard = self.inner.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(closed)?;
        query.fetch_all(&mut **tx).await
    }

    /// Fetch exactly one row; no row is `sqlx::Error::RowNotFound`
    pub async fn fetch_one<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> Result<O, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        let mut guard = self.inner.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(closed)?;
        query.fetch_one(&mut **tx).await
    }

    pub async fn fetch_optional<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> Result<Option<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        let mut guard = self.inner.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(closed)?;
        query.fetch_optional(&mut **tx).await
    }
}

#[async_trait]
impl TransactionHandle for PgTransaction {
    async fn commit(&self) -> Result<(), StoreError> {
        let mut guard = self.inner.tx.lock().await;
        let Some(tx) = guard.take() else {
            tracing::trace!("commit on finished transaction ignored");
            return Ok(());
        };
        self.inner.finished.store(true, Ordering::SeqCst);
        tx.commit()
            .await
            .map_err(|e| StoreError::database_operation(TX_TABLE, "commit", e))
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        let mut guard = self.inner.tx.lock().await;
        let Some(tx) = guard.take() else {
            tracing::trace!("rollback on finished transaction ignored");
            return Ok(());
        };
        self.inner.finished.store(true, Ordering::SeqCst);
        tx.rollback()
            .await
            .map_err(|e| StoreError::database_operation(TX_TABLE, "rollback", e))
    }

    fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::SeqCst)
    }
}

/// Opens [`PgTransaction`]s on a bounded pool
#[derive(Clone, Debug)]
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    type Handle = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::database_operation(TX_TABLE, "begin", e))?;
        Ok(PgTransaction::new(tx))
    }
}
