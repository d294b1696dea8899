use super::order_item::{ITEM_COLUMNS, ITEM_TABLE};
use super::session::PgSession;
use super::transaction::PgTransaction;
use crate::errors::StoreError;
use crate::models::{NewOrder, Order, OrderItem};
use crate::traits::{OrderRepository, WithTransaction};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const TABLE: &str = "orders";
const COLUMNS: &str = "id, customer_id, total_cents, status, created_at, updated_at";

/// Order store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgOrderStore {
    session: PgSession,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            session: PgSession::new(pool),
        }
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItem>>, StoreError> {
        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM {ITEM_TABLE} WHERE order_id = ANY($1) ORDER BY line_seq"
        );
        let items = self
            .session
            .fetch_all(sqlx::query_as::<_, OrderItem>(&sql).bind(order_ids.to_vec()))
            .await
            .map_err(|e| StoreError::database_operation(ITEM_TABLE, "load_items", e))?;

        for item in items {
            grouped.entry(item.order_id).or_default().push(item);
        }
        Ok(grouped)
    }
}

impl WithTransaction<PgTransaction> for PgOrderStore {
    fn with_tx(&self, tx: &PgTransaction) -> Self {
        Self {
            session: self.session.bind(tx),
        }
    }
}

#[async_trait]
impl OrderRepository for PgOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError> {
        let sql = format!(
            "INSERT INTO {TABLE} (customer_id, total_cents, status) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        self.session
            .fetch_one(
                sqlx::query_as::<_, Order>(&sql)
                    .bind(order.customer_id)
                    .bind(order.total_cents)
                    .bind(order.status),
            )
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "create", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        let order = self
            .session
            .fetch_optional(sqlx::query_as::<_, Order>(&sql).bind(id))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "find_by_id", e))?;

        let Some(mut order) = order else {
            return Ok(None);
        };
        let mut items = self.load_items(&[order.id]).await?;
        order.items = items.remove(&order.id).unwrap_or_default();
        Ok(Some(order))
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY created_at DESC");
        let mut orders = self
            .session
            .fetch_all(sqlx::query_as::<_, Order>(&sql))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "list_all", e))?;

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut items = self.load_items(&ids).await?;
        for order in orders.iter_mut() {
            order.items = items.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    async fn count_by_customer(&self, customer_id: Uuid) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {TABLE} WHERE customer_id = $1");
        let (count,) = self
            .session
            .fetch_one(sqlx::query_as::<_, (i64,)>(&sql).bind(customer_id))
            .await
            .map_err(|e| StoreError::database_operation(TABLE, "count_by_customer", e))?;
        Ok(count)
    }
}
