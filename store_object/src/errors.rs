use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error during {operation} on {table}: {source}")]
    Database {
        table: &'static str,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transaction already committed or rolled back")]
    TransactionClosed,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn database_operation(table: &'static str, operation: &'static str, source: sqlx::Error) -> Self {
        StoreError::Database {
            table,
            operation,
            source,
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. }
                | StoreError::Database {
                    source: sqlx::Error::RowNotFound,
                    ..
                }
        )
    }

    /// True when the pool could not hand out a connection in time
    pub fn is_pool_exhausted(&self) -> bool {
        matches!(
            self,
            StoreError::Database {
                source: sqlx::Error::PoolTimedOut,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_counts_as_not_found() {
        let err = StoreError::database_operation("products", "find_by_id", sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
        assert!(StoreError::not_found("Customer", "c1").is_not_found());
        assert!(!StoreError::TransactionClosed.is_not_found());
    }

    #[test]
    fn test_pool_timeout_is_detected() {
        let err = StoreError::database_operation("transaction", "begin", sqlx::Error::PoolTimedOut);
        assert!(err.is_pool_exhausted());
        assert!(err.to_string().contains("begin on transaction"));
    }
}
