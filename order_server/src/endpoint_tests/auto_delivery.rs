use actix_web::{http::StatusCode, web, web::ServiceConfig};
use order_engine::{
    db_types::{DigitalFile, OrderStatusType, ProductDelivery},
    AutoDeliveryApi,
    AUTO_DELIVERY_MARKER,
};
use serde_json::json;
use sqlx::types::Json;

use super::{
    helpers::{deliverable_fixture, order_fixture, post_request},
    mocks::MockOrderStoreBackend,
};
use crate::routes::AutoDeliverRoute;

fn configure_with(mock: MockOrderStoreBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = AutoDeliveryApi::new(mock);
        cfg.app_data(web::Data::new(api)).service(AutoDeliverRoute::<MockOrderStoreBackend>::new());
    }
}

fn ebook_product() -> ProductDelivery {
    ProductDelivery {
        product_id: "prod-1".to_string(),
        seller_id: "seller-1".to_string(),
        title: "Field Notes".to_string(),
        digital_files: Json(vec![DigitalFile {
            name: Some("ebook.pdf".to_string()),
            url: "https://x/e.pdf".to_string(),
            size: None,
        }]),
        course_links: Json(Vec::new()),
        course_passkeys: Json(Vec::new()),
        course_notes: None,
        auto_deliver: false,
    }
}

#[actix_web::test]
async fn digital_files_are_delivered() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id()
        .returning(|id| Ok(Some(order_fixture(id, OrderStatusType::Confirmed))));
    mock.expect_fetch_product_delivery().returning(|_| Ok(Some(ebook_product())));
    mock.expect_deliverable_exists_with_description().returning(|_, _| Ok(false));
    mock.expect_insert_deliverable()
        .withf(|d| d.description.as_deref() == Some(AUTO_DELIVERY_MARKER) && d.file_name == "ebook.pdf")
        .returning(|d| Ok(deliverable_fixture(d.order_id, &d.file_name, d.description.as_deref().unwrap())));

    let body = json!({ "orderId": 1, "productId": "prod-1" });
    let (status, body) = post_request("/orders/1/auto-deliver", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"delivered":true,"artifacts":["digital-files"]}"#);
}

#[actix_web::test]
async fn ineligible_product_reports_not_delivered() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id()
        .returning(|id| Ok(Some(order_fixture(id, OrderStatusType::Confirmed))));
    let mut bespoke = ebook_product();
    bespoke.digital_files = Json(Vec::new());
    mock.expect_fetch_product_delivery().returning(move |_| Ok(Some(bespoke.clone())));

    let body = json!({ "orderId": 1, "productId": "prod-1" });
    let (status, body) = post_request("/orders/1/auto-deliver", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"delivered":false,"artifacts":[]}"#);
}

#[actix_web::test]
async fn missing_product_id_is_rejected() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id().times(0);

    let body = json!({ "orderId": 1 });
    let (status, body) = post_request("/orders/1/auto-deliver", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("productId"));
}

#[actix_web::test]
async fn mismatched_product_is_rejected() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id()
        .returning(|id| Ok(Some(order_fixture(id, OrderStatusType::Confirmed))));

    let body = json!({ "orderId": 1, "productId": "prod-other" });
    let (status, _) = post_request("/orders/1/auto-deliver", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_order_is_not_found() {
    let _ = env_logger::try_init();
    let mut mock = MockOrderStoreBackend::new();
    mock.expect_fetch_order_by_id().returning(|_| Ok(None));

    let body = json!({ "orderId": 7, "productId": "prod-1" });
    let (status, _) = post_request("/orders/7/auto-deliver", body, configure_with(mock)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
