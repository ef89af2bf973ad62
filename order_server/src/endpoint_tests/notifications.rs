use actix_web::{http::StatusCode, web, web::ServiceConfig};
use order_engine::{events::EventProducers, OrderFlowApi};
use serde_json::json;

use super::{
    helpers::{notification_fixture, post_request},
    mocks::MockOrderStoreBackend,
};
use crate::routes::CreateNotificationRoute;

fn configure_with(mock: MockOrderStoreBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(mock, EventProducers::default());
        cfg.app_data(web::Data::new(api)).service(CreateNotificationRoute::<MockOrderStoreBackend>::new());
    }
}

#[actix_web::test]
async fn notification_is_stored() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_insert_notification()
        .withf(|n| n.user_id == "buyer-1" && n.notification_type == "order_completed")
        .returning(|n| Ok(notification_fixture(&n.user_id, &n.notification_type, 1)));

    let body = json!({
        "user_id": "buyer-1",
        "type": "order_completed",
        "title": "Order Completed",
        "message": "Order ORD-1 is done",
        "data": { "order_id": 1 }
    });
    let (status, body) = post_request("/notifications", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true}"#);
}

#[actix_web::test]
async fn missing_required_fields_are_rejected() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_insert_notification().times(0);

    let body = json!({ "user_id": "buyer-1", "title": "no type or message" });
    let (status, body) = post_request("/notifications", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("type"));
}

#[actix_web::test]
async fn blank_fields_are_rejected_by_the_engine() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_insert_notification().times(0);

    let body = json!({ "user_id": "  ", "type": "order_completed", "title": "t", "message": "m" });
    let (status, _) = post_request("/notifications", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
