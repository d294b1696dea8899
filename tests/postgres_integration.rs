//! End-to-end checks against a live PostgreSQL server
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`. The
//! schema is recreated, so point it at a scratch database.

use shopkeep::{CreateOrderRequest, OrderErrorKind, OrderLine, Shopkeep, WorkflowConfig};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use store_object::prelude::*;

async fn connect() -> Shopkeep {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    let shopkeep = Shopkeep::from_pool(pool);
    shopkeep.migrate(true).await.expect("migrate");
    shopkeep
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_order_lifecycle_on_postgres() {
    let shopkeep = connect().await;
    shopkeep.health_check().await.unwrap();
    let repos = shopkeep.repositories();
    let service = shopkeep.order_service(WorkflowConfig::default(), None);

    let customer = repos
        .customers
        .create(NewCustomer::new("Ada", "Lovelace", "ada@example.com"))
        .await
        .unwrap();
    let desk = repos
        .products
        .create(NewProduct::new("Desk", 50_000, 10))
        .await
        .unwrap();

    let order = service
        .create_order(CreateOrderRequest::new(
            customer.id,
            vec![OrderLine::new(desk.id, 2)],
        ))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_cents, 100_000);
    assert_eq!(repos.products.find_by_id(desk.id).await.unwrap().unwrap().stock, 8);

    let fetched = service.get_order(order.id).await.unwrap();
    assert_eq!(fetched.items, order.items);

    let missing = Uuid::new_v4();
    let err = service
        .create_order(CreateOrderRequest::new(
            customer.id,
            vec![OrderLine::new(desk.id, 1), OrderLine::new(missing, 1)],
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), OrderErrorKind::ProductNotFound);
    assert_eq!(repos.products.find_by_id(desk.id).await.unwrap().unwrap().stock, 8);
    assert_eq!(repos.orders.count_by_customer(customer.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_row_lock_serializes_concurrent_orders_on_postgres() {
    let shopkeep = connect().await;
    let repos = shopkeep.repositories();
    let service = Arc::new(shopkeep.order_service(WorkflowConfig::default(), None));

    let customer = repos
        .customers
        .create(NewCustomer::new("Grace", "Hopper", "grace@example.com"))
        .await
        .unwrap();
    let sofa = repos
        .products
        .create(NewProduct::new("Sofa", 120_000, 3))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = service.clone();
        let request = CreateOrderRequest::new(customer.id, vec![OrderLine::new(sofa.id, 2)]);
        handles.push(tokio::spawn(async move { service.create_order(request).await }));
    }
    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(repos.products.find_by_id(sofa.id).await.unwrap().unwrap().stock, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_bound_transaction_rolls_back_on_postgres() {
    let shopkeep = connect().await;
    let repos = shopkeep.repositories();
    let manager = shopkeep.transaction_manager();

    let lamp = repos
        .products
        .create(NewProduct::new("Lamp", 1_999, 4))
        .await
        .unwrap();

    let tx = manager.begin().await.unwrap();
    let bound = repos.with_tx(&tx);
    let locked = bound.products.find_by_id_for_update(lamp.id).await.unwrap().unwrap();
    bound.products.update(&locked.with_stock(0).unwrap()).await.unwrap();
    assert_eq!(bound.products.find_by_id(lamp.id).await.unwrap().unwrap().stock, 0);
    tx.rollback().await.unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(repos.products.find_by_id(lamp.id).await.unwrap().unwrap().stock, 4);
    assert!(matches!(
        bound.products.find_by_id(lamp.id).await,
        Err(StoreError::Database { .. })
    ));
}
