use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{
        NewDeliverable,
        NewMessage,
        NewNotification,
        NewOrder,
        Notification,
        Order,
        OrderDeliverable,
        OrderMessage,
        OrderNumber,
        OrderStatusType,
        PaymentStatusType,
        ProductDelivery,
    },
    oms_api::order_objects::OrderQueryFilter,
    traits::{StatusStamps, UserRole},
};

/// The storage contract consumed by the order flow, delivery trigger and lifecycle sweeper.
///
/// Implementations own durability and consistent reads for orders and their child records. Two
/// properties of this contract carry the engine's correctness guarantees:
///
/// * [`update_order_status`](OrderStore::update_order_status) is a compare-and-swap: the write
///   only lands if the order's current status is one the caller expected. Concurrent writers for
///   the same order cannot corrupt state; whoever lands first wins and the loser observes `None`.
/// * Every insert-only side table has an existence check scoped to an (order, discriminator)
///   pair, so automated writers can make retried invocations converge instead of duplicating
///   side effects.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone {
    /// The URL of the backing database.
    fn url(&self) -> &str;

    /// Inserts a brand-new order with status `pending` and payment status `pending`.
    ///
    /// The order number must be unique; a collision returns
    /// [`OrderStoreError::DuplicateOrderNumber`] so the caller can regenerate and retry.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError>;

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError>;

    /// Conditionally moves an order to `new_status`, stamping any timestamps in `stamps`.
    ///
    /// The update lands only if the order's current status is one of `expected`; otherwise
    /// `Ok(None)` is returned and nothing is written. A lost race is not an error — callers
    /// decide whether to skip silently (the sweeper) or surface a conflict (explicit actions).
    async fn update_order_status(
        &self,
        id: i64,
        expected: &[OrderStatusType],
        new_status: OrderStatusType,
        stamps: StatusStamps,
    ) -> Result<Option<Order>, OrderStoreError>;

    /// Updates the independent payment axis. Does not touch `status`.
    async fn update_payment_status(&self, id: i64, status: PaymentStatusType) -> Result<Order, OrderStoreError>;

    /// All orders in which `user_id` participates in the given role, newest first.
    async fn fetch_orders_for_user(&self, user_id: &str, role: UserRole) -> Result<Vec<Order>, OrderStoreError>;

    /// Orders sitting in `status` whose approval deadline passed before `cutoff`, oldest deadline
    /// first, at most `limit` rows per call. The sweeper scans with `status = delivered`.
    async fn fetch_orders_in_status_before(
        &self,
        status: OrderStatusType,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Order>, OrderStoreError>;

    /// Fetches orders according to the criteria in the filter. Used by UI listings and admin
    /// tooling rather than by the automated components.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError>;

    async fn insert_deliverable(&self, deliverable: NewDeliverable) -> Result<OrderDeliverable, OrderStoreError>;

    /// Whether the order already has a deliverable carrying exactly this description. The
    /// delivery trigger's idempotence guard.
    async fn deliverable_exists_with_description(
        &self,
        order_id: i64,
        description: &str,
    ) -> Result<bool, OrderStoreError>;

    async fn fetch_deliverables_for_order(&self, order_id: i64) -> Result<Vec<OrderDeliverable>, OrderStoreError>;

    async fn insert_message(&self, message: NewMessage) -> Result<OrderMessage, OrderStoreError>;

    /// Whether the order already has a system message starting with `prefix`
    /// (case-insensitive). Guards the course-access and auto-approval messages.
    async fn system_message_exists_with_prefix(&self, order_id: i64, prefix: &str) -> Result<bool, OrderStoreError>;

    async fn fetch_messages_for_order(&self, order_id: i64) -> Result<Vec<OrderMessage>, OrderStoreError>;

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, OrderStoreError>;

    /// Whether `user_id` was already notified with `notification_type` about this order.
    async fn notification_exists(
        &self,
        user_id: &str,
        notification_type: &str,
        order_id: i64,
    ) -> Result<bool, OrderStoreError>;

    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, OrderStoreError>;

    /// Delivery inputs for a product, or `None` if the product is unknown to the store.
    async fn fetch_product_delivery(&self, product_id: &str) -> Result<Option<ProductDelivery>, OrderStoreError>;

    /// Creates or replaces a product's delivery inputs. This is the interface boundary with the
    /// out-of-scope Product entity; the catalogue service (and tests) seed it.
    async fn upsert_product_delivery(&self, product: ProductDelivery) -> Result<(), OrderStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since order number {0} already exists")]
    DuplicateOrderNumber(OrderNumber),
    #[error("The requested order (id {0}) does not exist")]
    OrderNotFound(i64),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}
