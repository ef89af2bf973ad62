use std::collections::HashMap;

use actix_web::{http::StatusCode, test, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use mos_common::Money;
use order_engine::db_types::{Notification, Order, OrderDeliverable, OrderMessage, OrderNumber, OrderStatusType, PaymentStatusType};
use serde_json::{json, Value};
use sqlx::types::Json;

pub async fn post_request<F>(path: &str, body: Value, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = test::init_service(App::new().configure(configure)).await;
    let req = test::TestRequest::post().uri(path).set_json(body).to_request();
    let res = test::call_service(&app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).to_string())
}

pub fn order_fixture(id: i64, status: OrderStatusType) -> Order {
    let ts = Utc.with_ymd_and_hms(2026, 2, 28, 13, 30, 0).unwrap();
    Order {
        id,
        order_number: OrderNumber(format!("ORD-20260228-TST{id:03}")),
        buyer_id: "buyer-1".to_string(),
        seller_id: "seller-1".to_string(),
        product_id: "prod-1".to_string(),
        package_id: None,
        quantity: 1,
        unit_price: Money::from(2_500),
        total_price: Money::from(2_500),
        service_fee: Money::from(250),
        status,
        payment_status: PaymentStatusType::Completed,
        expected_delivery: None,
        delivered_at: None,
        completed_at: None,
        approve_by: None,
        requirements: Json(HashMap::new()),
        special_instructions: None,
        created_at: ts,
        updated_at: ts,
    }
}

pub fn message_fixture(order_id: i64, sender_id: &str, message: &str) -> OrderMessage {
    OrderMessage {
        id: 1,
        order_id,
        sender_id: sender_id.to_string(),
        message: message.to_string(),
        attachments: Json(Vec::new()),
        is_system_message: true,
        created_at: Utc.with_ymd_and_hms(2026, 2, 28, 13, 31, 0).unwrap(),
    }
}

pub fn deliverable_fixture(order_id: i64, file_name: &str, description: &str) -> OrderDeliverable {
    OrderDeliverable {
        id: 1,
        order_id,
        file_name: file_name.to_string(),
        file_url: "https://x/file".to_string(),
        file_size: None,
        file_type: None,
        description: Some(description.to_string()),
        uploaded_by: "seller-1".to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 2, 28, 13, 31, 0).unwrap(),
    }
}

pub fn notification_fixture(user_id: &str, notification_type: &str, order_id: i64) -> Notification {
    Notification {
        id: 1,
        user_id: user_id.to_string(),
        notification_type: notification_type.to_string(),
        title: "Order Completed".to_string(),
        message: "test".to_string(),
        data: Json(json!({ "order_id": order_id })),
        is_read: false,
        created_at: Utc.with_ymd_and_hms(2026, 2, 28, 13, 31, 0).unwrap(),
    }
}
