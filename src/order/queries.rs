//! Order read queries
//!
//! Reads run in their own short transaction so that an order and its items
//! are observed together.

use super::error::OrderError;
use super::service::{rollback, Aborted, OrderService};
use store_object::{
    Order, OrderRepository, StoreBackend, TransactionHandle, TransactionManager, WithTransaction,
};
use tracing::warn;
use uuid::Uuid;

impl<B: StoreBackend> OrderService<B> {
    /// Order with its items
    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, OrderError> {
        let outcome = self
            .read_in_transaction(|orders: B::Orders| async move {
                match orders.find_by_id(order_id).await {
                    Ok(Some(order)) => Ok(order),
                    Ok(None) => Err(OrderError::OrderNotFound { order_id }),
                    Err(source) => Err(OrderError::OrderLookupFailed { source }),
                }
            })
            .await;
        outcome.map_err(|aborted| {
            if !aborted.error.is_business_rule() {
                warn!(%order_id, error = %aborted.error, "order lookup failed");
            }
            aborted.error
        })
    }

    /// Every order with its items, newest first
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        self.read_in_transaction(|orders: B::Orders| async move {
            orders
                .list_all()
                .await
                .map_err(|source| OrderError::OrderLookupFailed { source })
        })
        .await
        .map_err(|aborted| {
            warn!(error = %aborted.error, "order listing failed");
            aborted.error
        })
    }

    async fn read_in_transaction<T, F, Fut>(&self, read: F) -> Result<T, Aborted>
    where
        F: FnOnce(B::Orders) -> Fut,
        Fut: std::future::Future<Output = Result<T, OrderError>>,
    {
        let tx = self
            .manager
            .begin()
            .await
            .map_err(|source| OrderError::TransactionBeginFailed { source })?;

        match read(self.repositories.orders.with_tx(&tx)).await {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|source| OrderError::TransactionCommitFailed { source })?;
                Ok(value)
            }
            Err(error) => Err(Aborted {
                error,
                rollback_error: rollback(&tx).await,
            }),
        }
    }
}
