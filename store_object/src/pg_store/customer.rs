use super::session::PgSession;
use super::transaction::PgTransaction;
use crate::errors::StoreError;
use crate::models::{Customer, NewCustomer};
use crate::traits::{CustomerRepository, WithTransaction};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const TABLE: &str = "customers";
const COLUMNS: &str = "id, first_name, last_name, email, created_at, updated_at";

/// Customer store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgCustomerStore {
    session: PgSession,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            session: PgSession::new(pool),
        }
    }
}

impl WithTransaction<PgTransaction> for PgCustomerStore {
    fn with_tx(&self, tx: &PgTransaction) -> Self {
        Self {
            session: self.session.bind(tx),
        }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerStore {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let sql = format!(
            "INSERT INTO {TABLE} (first_name, last_name, email) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        self.session
            .fetch_one(
                sqlx::query_as::<_, Customer>(&sql)
                    .bind(&customer.first_name)
                    .bind(&customer.last_name)
                    .bind(&customer.email),
            )
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "create", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        self.session
            .fetch_optional(sqlx::query_as::<_, Customer>(&sql).bind(id))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "find_by_id", e))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} WHERE email = $1");
        self.session
            .fetch_optional(sqlx::query_as::<_, Customer>(&sql).bind(email))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "find_by_email", e))
    }

    async fn list_all(&self) -> Result<Vec<Customer>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY created_at DESC");
        self.session
            .fetch_all(sqlx::query_as::<_, Customer>(&sql))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "list_all", e))
    }
}
