//! Database migration functionality
//!
//! Creates the order-fulfillment schema: the `order_status` enum, the four
//! tables with their CHECK constraints, and the `updated_at` triggers.

use crate::core::Shopkeep;
use crate::errors::ShopkeepError;

const DROP_SQL: &[&str] = &[
    "DROP TABLE IF EXISTS order_items, orders, products, customers CASCADE",
    "DROP TYPE IF EXISTS order_status",
];

const CREATE_SQL: &[&str] = &[
    r#"
    DO $$
    BEGIN
        CREATE TYPE order_status AS ENUM ('PENDING', 'PAID', 'SHIPPED', 'DELIVERED', 'CANCELLED');
    EXCEPTION
        WHEN duplicate_object THEN NULL;
    END $$
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
        stock INTEGER NOT NULL CHECK (stock >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        customer_id UUID NOT NULL REFERENCES customers(id),
        total_cents BIGINT NOT NULL CHECK (total_cents >= 0),
        status order_status NOT NULL DEFAULT 'PENDING',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_items (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        line_seq BIGSERIAL NOT NULL,
        order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id UUID NOT NULL REFERENCES products(id),
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
        sub_total_cents BIGINT NOT NULL,
        CHECK (sub_total_cents = price_cents * quantity)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_orders_customer_id ON orders (customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items (order_id)",
    r#"
    CREATE OR REPLACE FUNCTION update_updated_at_column()
    RETURNS TRIGGER AS $$
    BEGIN
        NEW.updated_at = NOW();
        RETURN NEW;
    END;
    $$ language 'plpgsql'
    "#,
];

/// Tables carrying an `updated_at` column
const TIMESTAMPED_TABLES: &[&str] = &["customers", "products", "orders"];

impl Shopkeep {
    /// Create the schema if it does not exist
    /// If recreate is true, drops existing tables and the status type first
    pub async fn migrate(&self, recreate: bool) -> Result<(), ShopkeepError> {
        if recreate {
            for sql in DROP_SQL {
                crate::debug_log!("Dropping with SQL: {}", sql);
                sqlx::query(sql).execute(self.pool()).await?;
            }
        }

        for sql in CREATE_SQL {
            crate::debug_log!("Creating with SQL: {}", sql);
            sqlx::query(sql).execute(self.pool()).await?;
        }

        for table in TIMESTAMPED_TABLES {
            // Use IF NOT EXISTS equivalent for triggers
            let trigger_sql = format!(
                "DO $$
                 BEGIN
                     IF NOT EXISTS (SELECT 1 FROM pg_trigger WHERE tgname = 'update_{table}_updated_at') THEN
                         CREATE TRIGGER update_{table}_updated_at
                         BEFORE UPDATE ON {table}
                         FOR EACH ROW
                         EXECUTE FUNCTION update_updated_at_column();
                     END IF;
                 END $$"
            );
            sqlx::query(&trigger_sql).execute(self.pool()).await?;
        }

        tracing::info!(recreate, "schema migrated");
        Ok(())
    }
}
