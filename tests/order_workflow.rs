mod common;

use common::{request, Shop};
use shopkeep::{OrderError, OrderErrorKind, WorkflowConfig};
use signal_system::OrderEventType;
use store_object::prelude::*;

#[tokio::test]
async fn test_single_line_order_decrements_stock() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;

    let order = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 2)]))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_id, customer.id);
    assert_eq!(order.total_cents, 100_000);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].order_id, order.id);
    assert_eq!(order.items[0].price_cents, 50_000);
    assert_eq!(order.items[0].sub_total_cents, 100_000);
    assert_eq!(shop.stock(desk.id), 8);
    assert_eq!(shop.db.commit_count(), 1);
}

#[tokio::test]
async fn test_unknown_customer_writes_nothing() {
    let shop = Shop::new(WorkflowConfig::default());
    let desk = shop.product("Desk", 50_000, 10).await;
    let unknown = Uuid::new_v4();

    let err = shop
        .service
        .create_order(request(unknown, &[(desk.id, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::CustomerNotFound { customer_id } if customer_id == unknown));
    assert_eq!(shop.stock(desk.id), 10);
    assert_eq!(shop.db.order_count(), 0);
    assert_eq!(shop.db.order_item_count(), 0);
    assert_eq!(shop.db.rollback_count(), 1);
}

#[tokio::test]
async fn test_insufficient_stock_leaves_stock_unchanged() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let lamp = shop.product("Lamp", 1_999, 1).await;

    let err = shop
        .service
        .create_order(request(customer.id, &[(lamp.id, 99)]))
        .await
        .unwrap_err();

    match err {
        OrderError::InsufficientStock {
            product_id,
            requested,
            available,
        } => {
            assert_eq!(product_id, lamp.id);
            assert_eq!(requested, 99);
            assert_eq!(available, 1);
        }
        other => panic!("expected insufficient stock, got {other:?}"),
    }
    assert_eq!(shop.stock(lamp.id), 1);
    assert_eq!(shop.db.order_count(), 0);
}

#[tokio::test]
async fn test_missing_second_product_rolls_back_first_decrement() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;
    let missing = Uuid::new_v4();

    let err = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 2), (missing, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), OrderErrorKind::ProductNotFound);
    assert_eq!(err.product_id(), Some(missing));
    assert_eq!(shop.stock(desk.id), 10);
    assert_eq!(shop.db.order_count(), 0);
    assert_eq!(shop.db.order_item_count(), 0);
}

#[tokio::test]
async fn test_multi_line_totals_are_exact() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;
    let pen = shop.product("Pen", 199, 100).await;
    let lamp = shop.product("Lamp", 1_999, 4).await;

    let order = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 1), (pen.id, 7), (lamp.id, 3)]))
        .await
        .unwrap();

    assert_eq!(order.total_cents, 50_000 + 7 * 199 + 3 * 1_999);
    assert_eq!(order.total_cents, order.items_total_cents());
    for item in &order.items {
        assert_eq!(item.sub_total_cents, item.price_cents * i64::from(item.quantity));
    }
    // items keep request order
    let products: Vec<Uuid> = order.items.iter().map(|i| i.product_id).collect();
    assert_eq!(products, vec![desk.id, pen.id, lamp.id]);

    assert_eq!(shop.stock(desk.id), 9);
    assert_eq!(shop.stock(pen.id), 93);
    assert_eq!(shop.stock(lamp.id), 1);
}

#[tokio::test]
async fn test_order_can_take_the_last_unit() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let lamp = shop.product("Lamp", 1_999, 3).await;

    shop.service
        .create_order(request(customer.id, &[(lamp.id, 3)]))
        .await
        .unwrap();
    assert_eq!(shop.stock(lamp.id), 0);

    let err = shop
        .service
        .create_order(request(customer.id, &[(lamp.id, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), OrderErrorKind::InsufficientStock);
    assert_eq!(shop.stock(lamp.id), 0);
}

#[tokio::test]
async fn test_repeated_product_lines_share_stock() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let chair = shop.product("Chair", 15_000, 5).await;

    let order = shop
        .service
        .create_order(request(customer.id, &[(chair.id, 2), (chair.id, 2)]))
        .await
        .unwrap();
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_cents, 60_000);
    assert_eq!(shop.stock(chair.id), 1);

    let err = shop
        .service
        .create_order(request(customer.id, &[(chair.id, 1), (chair.id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InsufficientStock { available: 0, requested: 1, .. }
    ));
    assert_eq!(shop.stock(chair.id), 1);
}

#[tokio::test]
async fn test_price_snapshot_survives_catalog_change() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;

    let order = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 1)]))
        .await
        .unwrap();

    let mut repriced = shop.db.committed_product(desk.id).unwrap();
    repriced.price_cents = 65_000;
    shop.repos.products.update(&repriced).await.unwrap();

    let stored = shop.service.get_order(order.id).await.unwrap();
    assert_eq!(stored.items[0].price_cents, 50_000);
    assert_eq!(stored.total_cents, 50_000);

    let next = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 1)]))
        .await
        .unwrap();
    assert_eq!(next.items[0].price_cents, 65_000);
}

#[tokio::test]
async fn test_invalid_request_opens_no_transaction() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;

    let empty = shop
        .service
        .create_order(request(customer.id, &[]))
        .await
        .unwrap_err();
    assert_eq!(empty.kind(), OrderErrorKind::InvalidRequest);

    let negative = shop
        .service
        .create_order(request(customer.id, &[(desk.id, -1)]))
        .await
        .unwrap_err();
    assert_eq!(negative.kind(), OrderErrorKind::InvalidRequest);

    assert_eq!(shop.db.commit_count(), 0);
    assert_eq!(shop.db.rollback_count(), 0);
    assert_eq!(shop.stock(desk.id), 10);
}

#[tokio::test]
async fn test_get_and_list_orders() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;
    let pen = shop.product("Pen", 199, 100).await;

    let first = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 1)]))
        .await
        .unwrap();
    let second = shop
        .service
        .create_order(request(customer.id, &[(pen.id, 2), (desk.id, 1)]))
        .await
        .unwrap();

    let fetched = shop.service.get_order(second.id).await.unwrap();
    assert_eq!(fetched, second);

    let listed = shop.service.list_orders().await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(listed[0].items.len(), 2);

    assert_eq!(shop.repos.orders.count_by_customer(customer.id).await.unwrap(), 2);

    let missing = Uuid::new_v4();
    let err = shop.service.get_order(missing).await.unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound { order_id } if order_id == missing));
}

#[tokio::test]
async fn test_outcomes_are_signalled() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;

    let order = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 2)]))
        .await
        .unwrap();
    shop.service
        .create_order(request(customer.id, &[(desk.id, 50)]))
        .await
        .unwrap_err();

    let events = shop.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, OrderEventType::Created);
    assert_eq!(events[0].order_id, Some(order.id));
    assert_eq!(events[0].total_cents, 100_000);
    assert_eq!(events[1].event_type, OrderEventType::Failed);
    assert_eq!(events[1].error_kind.as_deref(), Some("insufficient_stock"));
    assert!(events[1].rollback_error.is_none());

    let stats = shop.signals.stats();
    assert_eq!(stats.orders_created, 1);
    assert_eq!(stats.orders_failed, 1);
    assert_eq!(stats.revenue_cents, 100_000);
}

#[tokio::test]
async fn test_panicking_subscriber_does_not_hide_committed_order() {
    let shop = Shop::new(WorkflowConfig::default());
    let customer = shop.customer().await;
    let desk = shop.product("Desk", 50_000, 10).await;
    shop.signals.add_callback(|_event| panic!("subscriber bug"));

    let order = shop
        .service
        .create_order(request(customer.id, &[(desk.id, 2)]))
        .await
        .unwrap();

    assert_eq!(order.total_cents, 100_000);
    assert_eq!(shop.stock(desk.id), 8);
    assert_eq!(shop.db.order_count(), 1);
    assert_eq!(shop.signals.stats().orders_created, 1);
}
