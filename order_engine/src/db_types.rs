use std::{collections::HashMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use mos_common::Money;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

//--------------------------------------    OrderNumber      ---------------------------------------------------------
/// The human-readable order number, generated at creation and unique across the store.
/// Used for display and search; the integer row id remains the internal identity.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct StatusConversionError(String);

//--------------------------------------  OrderStatusType    ---------------------------------------------------------
/// Workflow state of an order. This is the single source of truth for where an order sits in its
/// lifecycle; payment settlement is tracked independently by [`PaymentStatusType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// Newly created at checkout. No seller action has been taken yet.
    Pending,
    /// The seller has accepted the order.
    Confirmed,
    /// The seller is actively working on the order.
    InProgress,
    /// The buyer has asked for rework on a delivered or in-progress order.
    RevisionRequested,
    /// The seller has delivered; the buyer's approval window is running.
    Delivered,
    /// The buyer (or the auto-approval sweeper) accepted the delivery. Terminal.
    Completed,
    /// The order was cancelled. Terminal.
    Cancelled,
    /// The order was refunded. Terminal.
    Refunded,
    /// A party raised a dispute; resolution is support-driven.
    Disputed,
}

impl OrderStatusType {
    /// Terminal statuses are financial records and must never be overwritten, least of all by an
    /// automated process.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Completed | OrderStatusType::Cancelled | OrderStatusType::Refunded)
    }

    /// Whether the state machine permits moving from `self` to `new`.
    ///
    /// The forward path is pending → confirmed → in_progress → delivered → completed. Revisions
    /// loop delivered/in_progress back through revision_requested. Any non-terminal status can
    /// branch to cancelled, refunded or disputed; a dispute resolves to one of the terminal
    /// statuses. Terminal statuses have no outgoing edges.
    pub fn can_transition_to(&self, new: OrderStatusType) -> bool {
        use OrderStatusType::*;
        if self.is_terminal() || *self == new {
            return false;
        }
        match (*self, new) {
            (Pending, Confirmed) => true,
            (Confirmed, InProgress) => true,
            (InProgress, Delivered | RevisionRequested) => true,
            (RevisionRequested, InProgress) => true,
            (Delivered, Completed | RevisionRequested) => true,
            (Disputed, Completed | Cancelled | Refunded) => true,
            (_, Cancelled | Refunded | Disputed) => true,
            (_, _) => false,
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Pending => "pending",
            OrderStatusType::Confirmed => "confirmed",
            OrderStatusType::InProgress => "in_progress",
            OrderStatusType::RevisionRequested => "revision_requested",
            OrderStatusType::Delivered => "delivered",
            OrderStatusType::Completed => "completed",
            OrderStatusType::Cancelled => "cancelled",
            OrderStatusType::Refunded => "refunded",
            OrderStatusType::Disputed => "disputed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" => Ok(Self::InProgress),
            "revision_requested" => Ok(Self::RevisionRequested),
            "delivered" => Ok(Self::Delivered),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            "disputed" => Ok(Self::Disputed),
            s => Err(StatusConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to pending");
            OrderStatusType::Pending
        })
    }
}

//-------------------------------------- PaymentStatusType   ---------------------------------------------------------
/// Settlement state of the payment backing an order. Independent of [`OrderStatusType`]: payment
/// confirmation does not imply fulfillment, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatusType {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatusType::Pending => "pending",
            PaymentStatusType::Processing => "processing",
            PaymentStatusType::Completed => "completed",
            PaymentStatusType::Failed => "failed",
            PaymentStatusType::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PaymentStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            s => Err(StatusConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    pub package_id: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub service_fee: Money,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatusType,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Deadline for buyer auto-approval. Absent until the order is delivered.
    pub approve_by: Option<DateTime<Utc>>,
    pub requirements: Json<HashMap<String, String>>,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The generated order number. Must be unique; the store rejects duplicates so callers can
    /// regenerate and retry.
    pub order_number: OrderNumber,
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    pub package_id: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub service_fee: Money,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub requirements: HashMap<String, String>,
    pub special_instructions: Option<String>,
}

impl NewOrder {
    pub fn new(
        order_number: OrderNumber,
        buyer_id: String,
        seller_id: String,
        product_id: String,
        quantity: i64,
        unit_price: Money,
        total_price: Money,
    ) -> Self {
        Self {
            order_number,
            buyer_id,
            seller_id,
            product_id,
            package_id: None,
            quantity,
            unit_price,
            total_price,
            service_fee: Money::from(0),
            expected_delivery: None,
            requirements: HashMap::new(),
            special_instructions: None,
        }
    }
}

//--------------------------------------  OrderDeliverable   ---------------------------------------------------------
/// A file or asset attached to an order as the product of fulfillment. Written by manual seller
/// uploads and by the automatic digital delivery path, which tags `description` with a fixed
/// marker so repeated trigger invocations can detect that delivery already happened.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderDeliverable {
    pub id: i64,
    pub order_id: i64,
    pub file_name: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub description: Option<String>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDeliverable {
    pub order_id: i64,
    pub file_name: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub description: Option<String>,
    pub uploaded_by: String,
}

//--------------------------------------    OrderMessage     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderMessage {
    pub id: i64,
    pub order_id: i64,
    pub sender_id: String,
    pub message: String,
    pub attachments: Json<Vec<String>>,
    pub is_system_message: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub order_id: i64,
    pub sender_id: String,
    pub message: String,
    pub attachments: Vec<String>,
    pub is_system_message: bool,
}

impl NewMessage {
    /// A platform-generated thread entry, flagged so the UI can distinguish it from human chat.
    pub fn system(order_id: i64, sender_id: String, message: String) -> Self {
        Self { order_id, sender_id, message, attachments: Vec::new(), is_system_message: true }
    }
}

//--------------------------------------    Notification     ---------------------------------------------------------
/// An out-of-band alert to a user. Insert-only; every triggering event creates a new row rather
/// than updating an existing one.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: Json<Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: Value,
}

impl NewNotification {
    /// An order-related notification. The order id rides in the data payload so the receiving UI
    /// can deep-link to the order.
    pub fn for_order<S1, S2, S3>(user_id: S1, notification_type: &str, title: S2, message: S3, order_id: i64) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            user_id: user_id.into(),
            notification_type: notification_type.to_string(),
            title: title.into(),
            message: message.into(),
            data: json!({ "order_id": order_id }),
        }
    }
}

//--------------------------------------    DigitalFile      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalFile {
    pub name: Option<String>,
    pub url: String,
    pub size: Option<i64>,
}

//--------------------------------------  ProductDelivery    ---------------------------------------------------------
/// Read-only delivery inputs from the Product entity: what, if anything, should be handed to the
/// buyer automatically once the order is underway.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductDelivery {
    pub product_id: String,
    pub seller_id: String,
    pub title: String,
    pub digital_files: Json<Vec<DigitalFile>>,
    pub course_links: Json<Vec<String>>,
    pub course_passkeys: Json<Vec<String>>,
    pub course_notes: Option<String>,
    pub auto_deliver: bool,
}

impl ProductDelivery {
    pub fn has_digital_files(&self) -> bool {
        !self.digital_files.0.is_empty()
    }

    pub fn has_course_payload(&self) -> bool {
        !self.course_links.0.is_empty()
            || !self.course_passkeys.0.is_empty()
            || self.course_notes.as_deref().map(|n| !n.trim().is_empty()).unwrap_or(false)
    }

    /// Whether the delivery trigger should do anything at all for this product.
    pub fn is_auto_deliverable(&self) -> bool {
        self.has_digital_files() || self.has_course_payload() || self.auto_deliver
    }
}
