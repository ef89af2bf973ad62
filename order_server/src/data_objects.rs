use chrono::{DateTime, Utc};
use order_engine::db_types::{OrderStatusType, PaymentStatusType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /orders/{id}/auto-deliver`. Storefront collaborators send camelCase keys, so
/// both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoDeliverParams {
    #[serde(alias = "orderId")]
    pub order_id: Option<i64>,
    #[serde(alias = "productId")]
    pub product_id: Option<String>,
}

/// Body of `POST /orders/{id}/auto-message`.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoMessageParams {
    #[serde(alias = "orderId")]
    pub order_id: Option<i64>,
    #[serde(alias = "creatorId")]
    pub creator_id: Option<String>,
    pub message: Option<String>,
}

/// Body of `POST /notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationParams {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateParams {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusParams {
    pub payment_status: PaymentStatusType,
}

/// Response of the cron-invoked lifecycle sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    pub success: bool,
    pub processed_count: usize,
    pub processed: Vec<i64>,
}

/// Query string of `GET /orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub order_number: Option<String>,
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub status: Option<OrderStatusType>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Query string of `GET /users/{user_id}/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserOrdersQuery {
    pub role: String,
}
