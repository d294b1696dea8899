use store_object::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Why an order operation did not complete
///
/// Every variant produced after a transaction was opened implies that the
/// transaction was rolled back and nothing from the request is durable.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("invalid order request: {0}")]
    InvalidRequest(String),

    #[error("failed to begin transaction: {source}")]
    TransactionBeginFailed {
        #[source]
        source: StoreError,
    },

    #[error("customer {customer_id} not found")]
    CustomerNotFound { customer_id: Uuid },

    #[error("failed to look up customer {customer_id}: {source}")]
    CustomerLookupFailed {
        customer_id: Uuid,
        #[source]
        source: StoreError,
    },

    #[error("product {product_id} not found")]
    ProductNotFound { product_id: Uuid },

    #[error("failed to look up product {product_id}: {source}")]
    ProductLookupFailed {
        product_id: Uuid,
        #[source]
        source: StoreError,
    },

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("failed to update stock for product {product_id}: {source}")]
    StockUpdateFailed {
        product_id: Uuid,
        #[source]
        source: StoreError,
    },

    #[error("failed to persist order: {source}")]
    OrderPersistenceFailed {
        #[source]
        source: StoreError,
    },

    #[error("failed to persist order item {item_index} (product {product_id}): {source}")]
    OrderItemPersistenceFailed {
        item_index: usize,
        product_id: Uuid,
        #[source]
        source: StoreError,
    },

    #[error("failed to commit transaction: {source}")]
    TransactionCommitFailed {
        #[source]
        source: StoreError,
    },

    #[error("order workflow exceeded its {timeout_ms}ms deadline")]
    DeadlineExceeded { timeout_ms: u64 },

    #[error("order {order_id} not found")]
    OrderNotFound { order_id: Uuid },

    #[error("failed to load orders: {source}")]
    OrderLookupFailed {
        #[source]
        source: StoreError,
    },
}

/// Fieldless discriminant of [`OrderError`], used as a metrics/event label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderErrorKind {
    InvalidRequest,
    TransactionBeginFailed,
    CustomerNotFound,
    CustomerLookupFailed,
    ProductNotFound,
    ProductLookupFailed,
    InsufficientStock,
    StockUpdateFailed,
    OrderPersistenceFailed,
    OrderItemPersistenceFailed,
    TransactionCommitFailed,
    DeadlineExceeded,
    OrderNotFound,
    OrderLookupFailed,
}

impl OrderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderErrorKind::InvalidRequest => "invalid_request",
            OrderErrorKind::TransactionBeginFailed => "transaction_begin_failed",
            OrderErrorKind::CustomerNotFound => "customer_not_found",
            OrderErrorKind::CustomerLookupFailed => "customer_lookup_failed",
            OrderErrorKind::ProductNotFound => "product_not_found",
            OrderErrorKind::ProductLookupFailed => "product_lookup_failed",
            OrderErrorKind::InsufficientStock => "insufficient_stock",
            OrderErrorKind::StockUpdateFailed => "stock_update_failed",
            OrderErrorKind::OrderPersistenceFailed => "order_persistence_failed",
            OrderErrorKind::OrderItemPersistenceFailed => "order_item_persistence_failed",
            OrderErrorKind::TransactionCommitFailed => "transaction_commit_failed",
            OrderErrorKind::DeadlineExceeded => "deadline_exceeded",
            OrderErrorKind::OrderNotFound => "order_not_found",
            OrderErrorKind::OrderLookupFailed => "order_lookup_failed",
        }
    }
}

impl std::fmt::Display for OrderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OrderError {
    pub fn kind(&self) -> OrderErrorKind {
        match self {
            OrderError::InvalidRequest(_) => OrderErrorKind::InvalidRequest,
            OrderError::TransactionBeginFailed { .. } => OrderErrorKind::TransactionBeginFailed,
            OrderError::CustomerNotFound { .. } => OrderErrorKind::CustomerNotFound,
            OrderError::CustomerLookupFailed { .. } => OrderErrorKind::CustomerLookupFailed,
            OrderError::ProductNotFound { .. } => OrderErrorKind::ProductNotFound,
            OrderError::ProductLookupFailed { .. } => OrderErrorKind::ProductLookupFailed,
            OrderError::InsufficientStock { .. } => OrderErrorKind::InsufficientStock,
            OrderError::StockUpdateFailed { .. } => OrderErrorKind::StockUpdateFailed,
            OrderError::OrderPersistenceFailed { .. } => OrderErrorKind::OrderPersistenceFailed,
            OrderError::OrderItemPersistenceFailed { .. } => {
                OrderErrorKind::OrderItemPersistenceFailed
            }
            OrderError::TransactionCommitFailed { .. } => OrderErrorKind::TransactionCommitFailed,
            OrderError::DeadlineExceeded { .. } => OrderErrorKind::DeadlineExceeded,
            OrderError::OrderNotFound { .. } => OrderErrorKind::OrderNotFound,
            OrderError::OrderLookupFailed { .. } => OrderErrorKind::OrderLookupFailed,
        }
    }

    /// Rejections caused by the request or the catalog, as opposed to
    /// infrastructure failures
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            OrderError::InvalidRequest(_)
                | OrderError::CustomerNotFound { .. }
                | OrderError::ProductNotFound { .. }
                | OrderError::InsufficientStock { .. }
                | OrderError::OrderNotFound { .. }
        )
    }

    /// Product the failure is about, when there is one
    pub fn product_id(&self) -> Option<Uuid> {
        match self {
            OrderError::ProductNotFound { product_id }
            | OrderError::ProductLookupFailed { product_id, .. }
            | OrderError::InsufficientStock { product_id, .. }
            | OrderError::StockUpdateFailed { product_id, .. }
            | OrderError::OrderItemPersistenceFailed { product_id, .. } => Some(*product_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_names_product() {
        let product_id = Uuid::new_v4();
        let err = OrderError::InsufficientStock {
            product_id,
            requested: 99,
            available: 1,
        };
        assert_eq!(err.kind(), OrderErrorKind::InsufficientStock);
        assert_eq!(err.product_id(), Some(product_id));
        assert!(err.to_string().contains(&product_id.to_string()));
        assert!(err.is_business_rule());
    }

    #[test]
    fn test_persistence_errors_keep_source() {
        let err = OrderError::OrderPersistenceFailed {
            source: StoreError::Backend("disk full".to_string()),
        };
        assert_eq!(err.kind().as_str(), "order_persistence_failed");
        assert!(!err.is_business_rule());
        assert!(std::error::Error::source(&err).is_some());
    }
}
