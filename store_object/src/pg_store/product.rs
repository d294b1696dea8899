use super::session::PgSession;
use super::transaction::PgTransaction;
use crate::errors::StoreError;
use crate::models::{NewProduct, Product};
use crate::traits::{clamp_page, ProductRepository, WithTransaction};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const TABLE: &str = "products";
const COLUMNS: &str = "id, name, description, price_cents, stock, created_at, updated_at";

/// Product store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgProductStore {
    session: PgSession,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            session: PgSession::new(pool),
        }
    }
}

impl WithTransaction<PgTransaction> for PgProductStore {
    fn with_tx(&self, tx: &PgTransaction) -> Self {
        Self {
            session: self.session.bind(tx),
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        product.validate()?;
        let sql = format!(
            "INSERT INTO {TABLE} (name, description, price_cents, stock) VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        self.session
            .fetch_one(
                sqlx::query_as::<_, Product>(&sql)
                    .bind(&product.name)
                    .bind(&product.description)
                    .bind(product.price_cents)
                    .bind(product.stock),
            )
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "create", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        self.session
            .fetch_optional(sqlx::query_as::<_, Product>(&sql).bind(id))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "find_by_id", e))
    }

    async fn find_by_id_for_update(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        if !self.session.is_transactional() {
            return self.find_by_id(id).await;
        }
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1 FOR UPDATE");
        self.session
            .fetch_optional(sqlx::query_as::<_, Product>(&sql).bind(id))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "find_by_id_for_update", e))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>, StoreError> {
        let (limit, offset) = clamp_page(limit, offset);
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY created_at DESC LIMIT $1 OFFSET $2");
        self.session
            .fetch_all(sqlx::query_as::<_, Product>(&sql).bind(limit).bind(offset))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "list", e))
    }

    async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        product.validate()?;
        let sql = format!(
            "UPDATE {TABLE} SET name = $1, description = $2, price_cents = $3, stock = $4, updated_at = NOW() \
             WHERE id = $5 RETURNING {COLUMNS}"
        );
        self.session
            .fetch_optional(
                sqlx::query_as::<_, Product>(&sql)
                    .bind(&product.name)
                    .bind(&product.description)
                    .bind(product.price_cents)
                    .bind(product.stock)
                    .bind(product.id),
            )
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "update", e))?
            .ok_or_else(|| StoreError::not_found("Product", product.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {TABLE} WHERE id = $1");
        let result = self
            .session
            .execute(sqlx::query(&sql).bind(id))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "delete", e))?;
        Ok(result.rows_affected() > 0)
    }
}
