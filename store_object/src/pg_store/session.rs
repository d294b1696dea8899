use super::transaction::PgTransaction;
use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgPool, Postgres};

/// Executor shared by every PostgreSQL store
///
/// Routes statements through the bound transaction when there is one and
/// through the pool otherwise.
#[derive(Clone)]
pub struct PgSession {
    pool: PgPool,
    tx: Option<PgTransaction>,
}

impl std::fmt::Debug for PgSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSession")
            .field("transactional", &self.is_transactional())
            .finish()
    }
}

impl PgSession {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    /// Shallow copy routed through `tx`
    pub fn bind(&self, tx: &PgTransaction) -> Self {
        Self {
            pool: self.pool.clone(),
            tx: Some(tx.clone()),
        }
    }

    pub fn is_transactional(&self) -> bool {
        self.tx.is_some()
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn execute<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, sqlx::Error> {
        match &self.tx {
            Some(tx) => tx.execute(query).await,
            None => query.execute(&self.pool).await,
        }
    }

    pub async fn fetch_all<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> Result<Vec<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match &self.tx {
            Some(tx) => tx.fetch_all(query).await,
            None => query.fetch_all(&self.pool).await,
        }
    }

    pub async fn fetch_one<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> Result<O, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match &self.tx {
            Some(tx) => tx.fetch_one(query).await,
            None => query.fetch_one(&self.pool).await,
        }
    }

    pub async fn fetch_optional<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> Result<Option<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match &self.tx {
            Some(tx) => tx.fetch_optional(query).await,
            None => query.fetch_optional(&self.pool).await,
        }
    }
}
