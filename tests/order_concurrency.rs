//! Two workflows racing for the same product
//!
//! With product locking enabled the second workflow waits for the first to
//! finish and then sees the decremented stock. With it disabled both read
//! the same stock level and both commit, overselling the product.

mod common;

use common::{request, Shop};
use shopkeep::{OrderError, OrderErrorKind, WorkflowConfig};
use std::sync::Arc;
use store_object::prelude::*;
use tokio::sync::Barrier;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_locked_orders_never_oversell() {
    let shop = Arc::new(Shop::new(WorkflowConfig::default()));
    let customer = shop.customer().await;
    let sofa = shop.product("Sofa", 120_000, 3).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let shop = shop.clone();
        let order = request(customer.id, &[(sofa.id, 2)]);
        handles.push(tokio::spawn(async move { shop.service.create_order(order).await }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                assert_eq!(order.total_cents, 240_000);
                created += 1;
            }
            Err(OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            }) => {
                assert_eq!(product_id, sofa.id);
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
                rejected += 1;
            }
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }

    assert_eq!((created, rejected), (1, 1));
    assert_eq!(shop.stock(sofa.id), 1);
    assert_eq!(shop.db.order_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_locked_orders_sell_exactly_the_stock() {
    let shop = Arc::new(Shop::new(WorkflowConfig::default()));
    let customer = shop.customer().await;
    let mug = shop.product("Mug", 899, 5).await;

    let mut handles = Vec::new();
    for _ in 0..12 {
        let shop = shop.clone();
        let order = request(customer.id, &[(mug.id, 1)]);
        handles.push(tokio::spawn(async move { shop.service.create_order(order).await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind(), OrderErrorKind::InsufficientStock),
        }
    }

    assert_eq!(created, 5);
    assert_eq!(shop.stock(mug.id), 0);
    assert_eq!(shop.db.order_item_count(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unlocked_orders_can_oversell() {
    let shop = Arc::new(Shop::new(WorkflowConfig::default().with_lock_products(false)));
    let customer = shop.customer().await;
    let sofa = shop.product("Sofa", 120_000, 3).await;

    // both workflows read the stock before either writes
    shop.db.set_product_read_barrier(Some(Arc::new(Barrier::new(2))));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let shop = shop.clone();
        let order = request(customer.id, &[(sofa.id, 2)]);
        handles.push(tokio::spawn(async move { shop.service.create_order(order).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // four units sold from a stock of three; the last writer wins
    assert_eq!(shop.db.order_count(), 2);
    let sold: i64 = shop
        .service
        .list_orders()
        .await
        .unwrap()
        .iter()
        .map(|order| order.total_units())
        .sum();
    assert_eq!(sold, 4);
    assert_eq!(shop.stock(sofa.id), 1);
}
