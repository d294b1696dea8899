use super::database::{FailurePoint, MemoryDatabase, Tables};
use super::session::MemorySession;
use super::transaction::MemoryTransaction;
use crate::errors::StoreError;
use crate::models::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, Product,
};
use crate::traits::{
    clamp_page, CustomerRepository, OrderItemRepository, OrderRepository, ProductRepository,
    WithTransaction,
};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

fn lookup_product(committed: &Tables, staged: Option<&Tables>, id: Uuid) -> Option<Product> {
    if let Some(staged) = staged {
        if staged.deleted_products.contains(&id) {
            return None;
        }
        if let Some(product) = staged.products.get(&id) {
            return Some(product.clone());
        }
    }
    committed.products.get(&id).cloned()
}

fn lookup_customer(committed: &Tables, staged: Option<&Tables>, id: Uuid) -> Option<Customer> {
    staged
        .and_then(|s| s.customers.get(&id))
        .or_else(|| committed.customers.get(&id))
        .cloned()
}

fn visible_orders<'a>(committed: &'a Tables, staged: Option<&'a Tables>) -> impl Iterator<Item = &'a Order> {
    committed
        .orders
        .iter()
        .chain(staged.into_iter().flat_map(|s| s.orders.iter()))
}

fn visible_items<'a>(committed: &'a Tables, staged: Option<&'a Tables>) -> impl Iterator<Item = &'a OrderItem> {
    committed
        .order_items
        .iter()
        .chain(staged.into_iter().flat_map(|s| s.order_items.iter()))
}

fn with_items(order: &Order, committed: &Tables, staged: Option<&Tables>) -> Order {
    let mut order = order.clone();
    order.items = visible_items(committed, staged)
        .filter(|item| item.order_id == order.id)
        .cloned()
        .collect();
    order
}

macro_rules! memory_store {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            session: MemorySession,
        }

        impl $name {
            pub fn new(db: MemoryDatabase) -> Self {
                Self {
                    session: MemorySession::new(db),
                }
            }
        }

        impl WithTransaction<MemoryTransaction> for $name {
            fn with_tx(&self, tx: &MemoryTransaction) -> Self {
                Self {
                    session: self.session.bind(tx),
                }
            }
        }
    };
}

memory_store!(
    /// Customer store on the memory engine
    MemoryCustomerStore
);
memory_store!(
    /// Product store on the memory engine
    MemoryProductStore
);
memory_store!(
    /// Order store on the memory engine
    MemoryOrderStore
);
memory_store!(
    /// Order-item store on the memory engine
    MemoryOrderItemStore
);

#[async_trait]
impl CustomerRepository for MemoryCustomerStore {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        self.session.statement().await;
        let taken = self.session.read(|committed, staged| {
            committed
                .customers
                .values()
                .chain(staged.into_iter().flat_map(|s| s.customers.values()))
                .any(|c| c.email == customer.email)
        })?;
        if taken {
            return Err(StoreError::validation(format!(
                "email {} is already registered",
                customer.email
            )));
        }

        let now = Utc::now();
        let created = Customer {
            id: Uuid::new_v4(),
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            created_at: now,
            updated_at: now,
        };
        let row = created.clone();
        self.session.write(move |t| {
            t.customers.insert(row.id, row);
        })?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, StoreError> {
        self.session.database().check_fault(FailurePoint::CustomerRead)?;
        self.session.statement().await;
        self.session
            .read(|committed, staged| lookup_customer(committed, staged, id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        self.session.statement().await;
        self.session.read(|committed, staged| {
            staged
                .into_iter()
                .flat_map(|s| s.customers.values())
                .chain(committed.customers.values())
                .find(|c| c.email == email)
                .cloned()
        })
    }

    async fn list_all(&self) -> Result<Vec<Customer>, StoreError> {
        self.session.statement().await;
        let mut customers = self.session.read(|committed, staged| {
            let mut all: Vec<Customer> = committed.customers.values().cloned().collect();
            if let Some(staged) = staged {
                all.extend(staged.customers.values().cloned());
            }
            all
        })?;
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(customers)
    }
}

impl MemoryProductStore {
    async fn read_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.session.database().check_fault(FailurePoint::ProductRead)?;
        let product = self
            .session
            .read(|committed, staged| lookup_product(committed, staged, id))?;
        if self.session.transaction().is_some() {
            self.session.database().product_read_barrier().await;
        }
        Ok(product)
    }
}

#[async_trait]
impl ProductRepository for MemoryProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        product.validate()?;
        self.session.statement().await;
        let now = Utc::now();
        let created = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        let row = created.clone();
        self.session.write(move |t| {
            t.products.insert(row.id, row);
        })?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.session.statement().await;
        self.read_product(id).await
    }

    async fn find_by_id_for_update(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.session.statement().await;
        if let Some(tx) = self.session.transaction() {
            tx.lock_row(id).await?;
        }
        self.read_product(id).await
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>, StoreError> {
        let (limit, offset) = clamp_page(limit, offset);
        self.session.statement().await;
        let mut products = self.session.read(|committed, staged| {
            let mut ids: Vec<Uuid> = committed.products.keys().copied().collect();
            if let Some(staged) = staged {
                ids.extend(staged.products.keys().filter(|id| !committed.products.contains_key(*id)));
            }
            ids.into_iter()
                .filter_map(|id| lookup_product(committed, staged, id))
                .collect::<Vec<_>>()
        })?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(products
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        product.validate()?;
        self.session.database().check_fault(FailurePoint::ProductUpdate)?;
        self.session.statement().await;

        let existing = self
            .session
            .read(|committed, staged| lookup_product(committed, staged, product.id))?
            .ok_or_else(|| StoreError::not_found("Product", product.id))?;

        let updated = Product {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..product.clone()
        };
        let row = updated.clone();
        self.session.write(move |t| {
            t.deleted_products.remove(&row.id);
            t.products.insert(row.id, row);
        })?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.session.statement().await;
        let existed = self
            .session
            .read(|committed, staged| lookup_product(committed, staged, id).is_some())?;
        if !existed {
            return Ok(false);
        }

        let staged = self.session.transaction().is_some();
        self.session.write(move |t| {
            t.products.remove(&id);
            if staged {
                t.deleted_products.insert(id);
            }
        })?;
        Ok(true)
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError> {
        self.session.database().check_fault(FailurePoint::OrderInsert)?;
        self.session.statement().await;

        let customer_exists = self
            .session
            .read(|committed, staged| lookup_customer(committed, staged, order.customer_id).is_some())?;
        if !customer_exists {
            return Err(StoreError::validation(format!(
                "order references unknown customer {}",
                order.customer_id
            )));
        }
        if order.total_cents < 0 {
            return Err(StoreError::validation(format!(
                "total_cents cannot be negative ({})",
                order.total_cents
            )));
        }

        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            customer_id: order.customer_id,
            total_cents: order.total_cents,
            status: order.status,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        };
        let row = created.clone();
        self.session.write(move |t| t.orders.push(row))?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        self.session.statement().await;
        self.session.read(|committed, staged| {
            visible_orders(committed, staged)
                .find(|o| o.id == id)
                .map(|o| with_items(o, committed, staged))
        })
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        self.session.statement().await;
        self.session.read(|committed, staged| {
            let mut orders: Vec<Order> = visible_orders(committed, staged)
                .map(|o| with_items(o, committed, staged))
                .collect();
            orders.reverse();
            orders
        })
    }

    async fn count_by_customer(&self, customer_id: Uuid) -> Result<i64, StoreError> {
        self.session.statement().await;
        self.session.read(|committed, staged| {
            visible_orders(committed, staged)
                .filter(|o| o.customer_id == customer_id)
                .count() as i64
        })
    }
}

#[async_trait]
impl OrderItemRepository for MemoryOrderItemStore {
    async fn create(&self, item: NewOrderItem) -> Result<OrderItem, StoreError> {
        let inserted = self
            .session
            .with_tx_state(|state| state.map(|s| s.items_inserted).unwrap_or(0))?;
        self.session
            .database()
            .check_fault(FailurePoint::OrderItemInsert { after: inserted })?;
        self.session.statement().await;

        if item.quantity <= 0 {
            return Err(StoreError::validation(format!(
                "quantity must be positive ({})",
                item.quantity
            )));
        }
        let order_exists = self.session.read(|committed, staged| {
            visible_orders(committed, staged).any(|o| o.id == item.order_id)
        })?;
        if !order_exists {
            return Err(StoreError::validation(format!(
                "order item references unknown order {}",
                item.order_id
            )));
        }

        let created = OrderItem {
            id: Uuid::new_v4(),
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price_cents: item.price_cents,
            sub_total_cents: item.sub_total_cents,
        };
        let row = created.clone();
        self.session.write(move |t| t.order_items.push(row))?;
        self.session.with_tx_state(|state| {
            if let Some(state) = state {
                state.items_inserted += 1;
            }
        })?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderItem>, StoreError> {
        self.session.statement().await;
        self.session.read(|committed, staged| {
            visible_items(committed, staged).find(|i| i.id == id).cloned()
        })
    }

    async fn list_by_order(&self, order_id: Uuid) -> Result<Vec<OrderItem>, StoreError> {
        self.session.statement().await;
        self.session.read(|committed, staged| {
            visible_items(committed, staged)
                .filter(|i| i.order_id == order_id)
                .cloned()
                .collect()
        })
    }
}
