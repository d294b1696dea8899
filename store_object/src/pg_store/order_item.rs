use super::session::PgSession;
use super::transaction::PgTransaction;
use crate::errors::StoreError;
use crate::models::{NewOrderItem, OrderItem};
use crate::traits::{OrderItemRepository, WithTransaction};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const ITEM_TABLE: &str = "order_items";
pub(crate) const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price_cents, sub_total_cents";

/// Order line store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgOrderItemStore {
    session: PgSession,
}

impl PgOrderItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            session: PgSession::new(pool),
        }
    }
}

impl WithTransaction<PgTransaction> for PgOrderItemStore {
    fn with_tx(&self, tx: &PgTransaction) -> Self {
        Self {
            session: self.session.bind(tx),
        }
    }
}

#[async_trait]
impl OrderItemRepository for PgOrderItemStore {
    async fn create(&self, item: NewOrderItem) -> Result<OrderItem, StoreError> {
        let sql = format!(
            "INSERT INTO {ITEM_TABLE} (order_id, product_id, quantity, price_cents, sub_total_cents) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ITEM_COLUMNS}"
        );
        self.session
            .fetch_one(
                sqlx::query_as::<_, OrderItem>(&sql)
                    .bind(item.order_id)
                    .bind(item.product_id)
                    .bind(item.quantity)
                    .bind(item.price_cents)
                    .bind(item.sub_total_cents),
            )
            .await
            .map_err(|e| StoreError::database_operation(ITEM_TABLE, "create", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderItem>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM {ITEM_TABLE} WHERE id = $1");
        self.session
            .fetch_optional(sqlx::query_as::<_, OrderItem>(&sql).bind(id))
            .await
            .map_err(|e| StoreError::database_operation(ITEM_TABLE, "find_by_id", e))
    }

    async fn list_by_order(&self, order_id: Uuid) -> Result<Vec<OrderItem>, StoreError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM {ITEM_TABLE} WHERE order_id = $1 ORDER BY line_seq"
        );
        self.session
            .fetch_all(sqlx::query_as::<_, OrderItem>(&sql).bind(order_id))
            .await
            .map_err(|e| StoreError::database_operation(ITEM_TABLE, "list_by_order", e))
    }
}
