//! Order creation and state-machine behavior over a real SQLite store.
mod support;

use chrono::Duration;
use mos_common::Money;
use order_engine::{
    db_types::{OrderStatusType, PaymentStatusType},
    events::EventProducers,
    traits::OrderStore,
    OrderFlowApi,
    OrderFlowError,
    SqliteOrderStore,
};
use support::{order_request, prepare_test_store, random_db_url, seed_order};

fn flow(store: &SqliteOrderStore) -> OrderFlowApi<SqliteOrderStore> {
    OrderFlowApi::new(store.clone(), EventProducers::default())
}

#[tokio::test]
async fn create_order_persists_commercial_fields() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let mut request = order_request("buyer-1", "seller-1", "prod-a");
    request.quantity = 3;
    request.unit_price = Money::from(1_000);
    request.total_price = Money::from(3_000);
    request.service_fee = Money::from(300);
    request.requirements.insert("colour".to_string(), "teal".to_string());

    let order = flow(&store).create_order(request).await.unwrap();
    assert!(order.order_number.as_str().starts_with("ORD-"));
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(order.payment_status, PaymentStatusType::Pending);
    assert_eq!(order.quantity, 3);
    assert_eq!(order.total_price, Money::from(3_000));
    assert_eq!(order.requirements.0.get("colour").map(String::as_str), Some("teal"));
    assert!(order.approve_by.is_none());

    let reloaded = store.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
    assert_eq!(reloaded.id, order.id);
}

#[tokio::test]
async fn create_order_rejects_bad_commercial_fields() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let api = flow(&store);

    let mut request = order_request("buyer-1", "seller-1", "prod-a");
    request.quantity = 0;
    assert!(matches!(api.create_order(request).await.unwrap_err(), OrderFlowError::ValidationError(_)));

    let mut request = order_request("buyer-1", "seller-1", "prod-a");
    request.service_fee = Money::from(-1);
    assert!(matches!(api.create_order(request).await.unwrap_err(), OrderFlowError::ValidationError(_)));

    let request = order_request("  ", "seller-1", "prod-a");
    assert!(matches!(api.create_order(request).await.unwrap_err(), OrderFlowError::ValidationError(_)));
}

#[tokio::test]
async fn forward_path_stamps_delivery_and_completion() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let api = flow(&store).with_approval_window(Duration::hours(48));
    let order = seed_order(&store, "buyer-1", "seller-1", "prod-a").await;

    api.transition(order.id, OrderStatusType::Confirmed).await.unwrap();
    api.transition(order.id, OrderStatusType::InProgress).await.unwrap();
    let delivered = api.transition(order.id, OrderStatusType::Delivered).await.unwrap();
    let delivered_at = delivered.delivered_at.expect("delivered_at must be stamped");
    let approve_by = delivered.approve_by.expect("approve_by must be stamped");
    assert_eq!(approve_by - delivered_at, Duration::hours(48));

    let completed = api.transition(order.id, OrderStatusType::Completed).await.unwrap();
    assert_eq!(completed.status, OrderStatusType::Completed);
    assert!(completed.completed_at.is_some());
}

#[tokio::test]
async fn transitions_notify_both_parties() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let api = flow(&store);
    let order = seed_order(&store, "buyer-7", "seller-7", "prod-a").await;

    api.transition(order.id, OrderStatusType::Confirmed).await.unwrap();

    for user in ["buyer-7", "seller-7"] {
        let notifications = store.fetch_notifications_for_user(user).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notification_type, "order_confirmed");
        assert_eq!(notifications[0].data.0["order_id"].as_i64(), Some(order.id));
    }
}

#[tokio::test]
async fn illegal_edges_are_rejected() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let api = flow(&store);
    let order = seed_order(&store, "buyer-1", "seller-1", "prod-a").await;

    // skipping ahead on the forward path
    let err = api.transition(order.id, OrderStatusType::Delivered).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidTransition { .. }));

    // terminal statuses have no outgoing edges
    api.transition(order.id, OrderStatusType::Cancelled).await.unwrap();
    let err = api.transition(order.id, OrderStatusType::Confirmed).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidTransition { from: OrderStatusType::Cancelled, .. }));
}

#[tokio::test]
async fn revision_loop_returns_to_in_progress() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let api = flow(&store);
    let order = seed_order(&store, "buyer-1", "seller-1", "prod-a").await;

    api.transition(order.id, OrderStatusType::Confirmed).await.unwrap();
    api.transition(order.id, OrderStatusType::InProgress).await.unwrap();
    api.transition(order.id, OrderStatusType::Delivered).await.unwrap();
    api.transition(order.id, OrderStatusType::RevisionRequested).await.unwrap();
    let back = api.transition(order.id, OrderStatusType::InProgress).await.unwrap();
    assert_eq!(back.status, OrderStatusType::InProgress);
}

#[tokio::test]
async fn payment_axis_is_independent_of_fulfillment() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let api = flow(&store);
    let order = seed_order(&store, "buyer-1", "seller-1", "prod-a").await;

    let updated = api.mark_payment_status(order.id, PaymentStatusType::Completed).await.unwrap();
    assert_eq!(updated.payment_status, PaymentStatusType::Completed);
    assert_eq!(updated.status, OrderStatusType::Pending);

    let err = api.mark_payment_status(9999, PaymentStatusType::Failed).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderNotFound(9999)));
}

#[tokio::test]
async fn system_messages_require_the_real_seller() {
    let url = random_db_url();
    let store = prepare_test_store(&url).await;
    let api = flow(&store);
    let order = seed_order(&store, "buyer-1", "seller-1", "prod-a").await;

    let err = api.post_system_message(order.id, "seller-imposter", "Hello".to_string()).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::SellerMismatch(_)));
    assert!(store.fetch_messages_for_order(order.id).await.unwrap().is_empty());

    let message = api.post_system_message(order.id, "seller-1", "Thanks for your order!".to_string()).await.unwrap();
    assert!(message.is_system_message);
    assert_eq!(message.sender_id, "seller-1");
}
