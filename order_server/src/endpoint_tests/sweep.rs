use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use order_engine::{db_types::OrderStatusType, events::EventProducers, traits::OrderStoreError, LifecycleApi};
use serde_json::json;

use super::{
    helpers::{message_fixture, notification_fixture, order_fixture, post_request},
    mocks::MockOrderStoreBackend,
};
use crate::routes::LifecycleSweepRoute;

fn configure_with(mock: MockOrderStoreBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = LifecycleApi::new(mock, EventProducers::default());
        cfg.app_data(web::Data::new(api)).service(LifecycleSweepRoute::<MockOrderStoreBackend>::new());
    }
}

#[actix_web::test]
async fn overdue_orders_are_processed_and_reported() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    let mut overdue = order_fixture(1, OrderStatusType::Delivered);
    overdue.approve_by = Some(Utc::now() - chrono::Duration::days(1));
    mock.expect_fetch_orders_in_status_before().returning(move |_, _, _| Ok(vec![overdue.clone()]));
    mock.expect_update_order_status().returning(|id, _, _, stamps| {
        let mut completed = order_fixture(id, OrderStatusType::Completed);
        completed.completed_at = stamps.completed_at;
        Ok(Some(completed))
    });
    mock.expect_system_message_exists_with_prefix().returning(|_, _| Ok(false));
    mock.expect_insert_message()
        .withf(|m| m.is_system_message && m.sender_id == "seller-1")
        .returning(|m| Ok(message_fixture(m.order_id, &m.sender_id, &m.message)));
    mock.expect_notification_exists().returning(|_, _, _| Ok(false));
    mock.expect_insert_notification()
        .times(2)
        .returning(|n| Ok(notification_fixture(&n.user_id, &n.notification_type, 1)));

    let (status, body) = post_request("/orders/lifecycle-sweep", json!({}), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"processed_count":1,"processed":[1]}"#);
}

#[actix_web::test]
async fn nothing_due_means_an_empty_pass() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_orders_in_status_before().returning(|_, _, _| Ok(Vec::new()));

    let (status, body) = post_request("/orders/lifecycle-sweep", json!({}), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"processed_count":0,"processed":[]}"#);
}

#[actix_web::test]
async fn scan_failure_surfaces_to_the_scheduler() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_orders_in_status_before()
        .returning(|_, _, _| Err(OrderStoreError::DatabaseError("connection reset".to_string())));

    let (status, body) = post_request("/orders/lifecycle-sweep", json!({}), configure_with(mock)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("error"));
}

#[actix_web::test]
async fn lost_race_is_skipped_silently() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    let mut overdue = order_fixture(1, OrderStatusType::Delivered);
    overdue.approve_by = Some(Utc::now() - chrono::Duration::days(1));
    mock.expect_fetch_orders_in_status_before().returning(move |_, _, _| Ok(vec![overdue.clone()]));
    // a human action moved the order out of `delivered` between the scan and the update
    mock.expect_update_order_status().returning(|_, _, _, _| Ok(None));
    mock.expect_insert_message().times(0);
    mock.expect_insert_notification().times(0);

    let (status, body) = post_request("/orders/lifecycle-sweep", json!({}), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"processed_count":0,"processed":[]}"#);
}
