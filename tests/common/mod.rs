#![allow(dead_code)]

use shopkeep::{CreateOrderRequest, OrderLine, OrderService, WorkflowConfig};
use signal_system::{OrderEvent, SignalManager};
use std::sync::{Arc, Mutex};
use store_object::prelude::*;

/// Order service over a fresh memory database, with a recording subscriber
pub struct Shop {
    pub db: MemoryDatabase,
    pub repos: Repositories<MemoryBackend>,
    pub service: OrderService<MemoryBackend>,
    pub signals: Arc<SignalManager>,
    pub events: Arc<Mutex<Vec<OrderEvent>>>,
}

impl Shop {
    pub fn new(config: WorkflowConfig) -> Self {
        Self::on(MemoryDatabase::new(), config)
    }

    pub fn on(db: MemoryDatabase, config: WorkflowConfig) -> Self {
        let signals = Arc::new(SignalManager::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        signals.add_callback(move |event: &OrderEvent| {
            sink.lock().unwrap().push(event.clone());
        });

        let repos = MemoryBackend::repositories(&db);
        let service = OrderService::new(
            MemoryBackend::transaction_manager(&db),
            repos.clone(),
            config,
        )
        .with_signals(signals.clone());

        Self {
            db,
            repos,
            service,
            signals,
            events,
        }
    }

    pub async fn customer(&self) -> Customer {
        let email = format!("{}@example.com", Uuid::new_v4());
        self.repos
            .customers
            .create(NewCustomer::new("Ada", "Lovelace", email))
            .await
            .unwrap()
    }

    pub async fn product(&self, name: &str, price_cents: i64, stock: i32) -> Product {
        self.repos
            .products
            .create(NewProduct::new(name, price_cents, stock))
            .await
            .unwrap()
    }

    pub fn stock(&self, product_id: Uuid) -> i32 {
        self.db.committed_product(product_id).unwrap().stock
    }

    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.lock().unwrap().clone()
    }
}

pub fn request(customer_id: Uuid, lines: &[(Uuid, i32)]) -> CreateOrderRequest {
    CreateOrderRequest::new(
        customer_id,
        lines
            .iter()
            .map(|(product_id, quantity)| OrderLine::new(*product_id, *quantity))
            .collect(),
    )
}
