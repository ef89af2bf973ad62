use actix_web::{http::StatusCode, web, web::ServiceConfig};
use order_engine::{db_types::OrderStatusType, events::EventProducers, OrderFlowApi};
use serde_json::json;

use super::{
    helpers::{message_fixture, order_fixture, post_request},
    mocks::MockOrderStoreBackend,
};
use crate::routes::AutoMessageRoute;

fn configure_with(mock: MockOrderStoreBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(mock, EventProducers::default());
        cfg.app_data(web::Data::new(api)).service(AutoMessageRoute::<MockOrderStoreBackend>::new());
    }
}

#[actix_web::test]
async fn wrong_creator_is_forbidden_and_nothing_is_written() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id()
        .returning(|id| Ok(Some(order_fixture(id, OrderStatusType::InProgress))));
    mock.expect_insert_message().times(0);

    let body = json!({ "orderId": 1, "creatorId": "seller-imposter", "message": "hi" });
    let (status, body) = post_request("/orders/1/auto-message", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("not the seller"));
}

#[actix_web::test]
async fn seller_automation_can_post() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id()
        .returning(|id| Ok(Some(order_fixture(id, OrderStatusType::InProgress))));
    mock.expect_insert_message()
        .withf(|m| m.is_system_message && m.sender_id == "seller-1")
        .returning(|m| Ok(message_fixture(m.order_id, &m.sender_id, &m.message)));

    let body = json!({ "orderId": 1, "creatorId": "seller-1", "message": "Thanks for your order!" });
    let (status, body) = post_request("/orders/1/auto-message", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);
}

#[actix_web::test]
async fn missing_fields_are_rejected() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id().times(0);

    let body = json!({ "orderId": 1, "message": "no creator here" });
    let (status, body) = post_request("/orders/1/auto-message", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("creatorId"));
}

#[actix_web::test]
async fn unknown_order_is_not_found() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id().returning(|_| Ok(None));

    let body = json!({ "orderId": 42, "creatorId": "seller-1", "message": "hi" });
    let (status, _) = post_request("/orders/42/auto-message", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
