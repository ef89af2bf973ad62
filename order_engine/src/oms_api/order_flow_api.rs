use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;

use crate::{
    db_types::{NewMessage, NewNotification, NewOrder, Notification, Order, OrderMessage, OrderStatusType, PaymentStatusType},
    events::{EventProducers, OrderCompletedEvent, OrderCreatedEvent, OrderDeliveredEvent},
    helpers::generate_order_number,
    oms_api::{
        errors::OrderFlowError,
        order_objects::{NewOrderRequest, OrderQueryFilter},
    },
    traits::{OrderStore, OrderStoreError, StatusStamps, UserRole},
};

/// How long a buyer has to approve a delivery before the sweeper does it for them.
pub const DEFAULT_APPROVAL_WINDOW: Duration = Duration::hours(72);

/// How many order numbers to generate before giving up on a uniqueness collision streak.
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

/// `OrderFlowApi` is the primary API for creating orders and moving them through the lifecycle in
/// response to buyer and seller actions.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    approval_window: Duration,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, approval_window: DEFAULT_APPROVAL_WINDOW }
    }

    pub fn with_approval_window(mut self, window: Duration) -> Self {
        self.approval_window = window;
        self
    }

    pub fn approval_window(&self) -> Duration {
        self.approval_window
    }
}

impl<B> OrderFlowApi<B>
where B: OrderStore
{
    /// Create a new order at checkout.
    ///
    /// The commercial fields are validated first: quantity must be at least 1, and none of the
    /// monetary fields may be negative. The order number is generated here (time-based prefix
    /// plus a random suffix); if the store reports a uniqueness collision, a fresh number is
    /// generated and the insert retried a bounded number of times.
    ///
    /// The order is persisted with status `pending` and payment status `pending`, and an
    /// `OrderCreatedEvent` is published.
    pub async fn create_order(&self, request: NewOrderRequest) -> Result<Order, OrderFlowError> {
        validate_new_order(&request)?;
        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = generate_order_number();
            let order = NewOrder {
                order_number,
                buyer_id: request.buyer_id.clone(),
                seller_id: request.seller_id.clone(),
                product_id: request.product_id.clone(),
                package_id: request.package_id.clone(),
                quantity: request.quantity,
                unit_price: request.unit_price,
                total_price: request.total_price,
                service_fee: request.service_fee,
                expected_delivery: request.expected_delivery,
                requirements: request.requirements.clone(),
                special_instructions: request.special_instructions.clone(),
            };
            match self.db.insert_order(order).await {
                Ok(order) => {
                    debug!("🛒️ Order {} created for buyer {}", order.order_number, order.buyer_id);
                    self.call_order_created_hook(&order).await;
                    return Ok(order);
                },
                Err(OrderStoreError::DuplicateOrderNumber(n)) => {
                    warn!("🛒️ Order number collision on {n} (attempt {attempt}). Regenerating.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        Err(OrderFlowError::OrderNumberExhausted)
    }

    /// Moves an order to a new status on behalf of a buyer or seller action.
    ///
    /// The permitted edges, with statuses abbreviated to their first letters:
    ///
    /// | From \ To      | Con | InP | Rev | Del | Com | Can | Ref | Dis |
    /// |----------------|-----|-----|-----|-----|-----|-----|-----|-----|
    /// | pending        | ✓   |     |     |     |     | ✓   | ✓   | ✓   |
    /// | confirmed      |     | ✓   |     |     |     | ✓   | ✓   | ✓   |
    /// | in_progress    |     |     | ✓   | ✓   |     | ✓   | ✓   | ✓   |
    /// | revision_req.  |     | ✓   |     |     |     | ✓   | ✓   | ✓   |
    /// | delivered      |     |     | ✓   |     | ✓   | ✓   | ✓   | ✓   |
    /// | disputed       |     |     |     |     | ✓   | ✓   | ✓   |     |
    /// | completed      |     |     |     |     |     |     |     |     |
    /// | cancelled      |     |     |     |     |     |     |     |     |
    /// | refunded       |     |     |     |     |     |     |     |     |
    ///
    /// Moving to `delivered` stamps `delivered_at` and starts the buyer's approval window
    /// (`approve_by = now + window`). Moving to `completed` stamps `completed_at`.
    ///
    /// The write is conditional on the status the order held when this call read it; if another
    /// writer lands in between, [`OrderFlowError::StatusRaced`] is returned and nothing is
    /// changed. On success both parties are notified and the matching lifecycle event is
    /// published.
    pub async fn transition(&self, id: i64, new_status: OrderStatusType) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound(id))?;
        let from = order.status;
        if !from.can_transition_to(new_status) {
            return Err(OrderFlowError::InvalidTransition { from, to: new_status });
        }
        let now = Utc::now();
        let stamps = match new_status {
            OrderStatusType::Delivered => StatusStamps::delivered(now, now + self.approval_window),
            OrderStatusType::Completed => StatusStamps::completed(now),
            _ => StatusStamps::default(),
        };
        let updated = self
            .db
            .update_order_status(id, &[from], new_status, stamps)
            .await?
            .ok_or(OrderFlowError::StatusRaced)?;
        debug!("🛒️ Order {} moved from {from} to {new_status}", updated.order_number);
        self.notify_parties(&updated).await?;
        match new_status {
            OrderStatusType::Delivered => self.call_order_delivered_hook(&updated).await,
            OrderStatusType::Completed => self.call_order_completed_hook(&updated, false).await,
            _ => {},
        }
        Ok(updated)
    }

    /// Posts a system message to the order thread on behalf of the seller's automation.
    ///
    /// The caller must present the seller's own id; anything else is rejected with
    /// [`OrderFlowError::SellerMismatch`] so that one seller's tooling cannot write into another
    /// seller's order threads.
    pub async fn post_system_message(
        &self,
        order_id: i64,
        creator_id: &str,
        message: String,
    ) -> Result<OrderMessage, OrderFlowError> {
        let order = self.db.fetch_order_by_id(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if order.seller_id != creator_id {
            debug!("🛒️ Rejecting system message for order {order_id}: {creator_id} is not the seller");
            return Err(OrderFlowError::SellerMismatch(creator_id.to_string()));
        }
        let message = NewMessage::system(order_id, creator_id.to_string(), message);
        let message = self.db.insert_message(message).await?;
        Ok(message)
    }

    /// Stores a notification for a user. The required fields must all be non-empty.
    pub async fn push_notification(&self, notification: NewNotification) -> Result<Notification, OrderFlowError> {
        for (field, value) in [
            ("user_id", &notification.user_id),
            ("type", &notification.notification_type),
            ("title", &notification.title),
            ("message", &notification.message),
        ] {
            if value.trim().is_empty() {
                return Err(OrderFlowError::InvalidRequest(format!("{field} must not be empty")));
            }
        }
        let notification = self.db.insert_notification(notification).await?;
        Ok(notification)
    }

    /// Records a payment-processor outcome on the payment axis. Fulfillment status is not
    /// touched; a paid order still waits for the seller, and a delivered order can still have a
    /// failed payment to chase.
    pub async fn mark_payment_status(&self, id: i64, status: PaymentStatusType) -> Result<Order, OrderFlowError> {
        let order = self.db.update_payment_status(id, status).await.map_err(|e| match e {
            OrderStoreError::OrderNotFound(id) => OrderFlowError::OrderNotFound(id),
            e => e.into(),
        })?;
        debug!("🛒️ Order {} payment status is now {status}", order.order_number);
        Ok(order)
    }

    /// Fetch a single order, failing if it is absent.
    pub async fn fetch_order(&self, id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound(id))
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        trace!("🛒️ Searching orders: {query}");
        let orders = self.db.search_orders(query).await?;
        Ok(orders)
    }

    pub async fn fetch_orders_for_user(&self, user_id: &str, role: UserRole) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id, role).await?;
        Ok(orders)
    }

    pub async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, OrderFlowError> {
        let notifications = self.db.fetch_notifications_for_user(user_id).await?;
        Ok(notifications)
    }

    /// One notification row per party for a status change. The conditional status update that
    /// preceded this call is the exactly-once guard: a retried transition loses the race and
    /// never reaches here.
    async fn notify_parties(&self, order: &Order) -> Result<(), OrderFlowError> {
        let notification_type = format!("order_{}", order.status);
        let (buyer_text, seller_text) = status_change_wording(order);
        let buyer = NewNotification::for_order(
            order.buyer_id.clone(),
            &notification_type,
            status_change_title(order.status),
            buyer_text,
            order.id,
        );
        self.db.insert_notification(buyer).await?;
        let seller = NewNotification::for_order(
            order.seller_id.clone(),
            &notification_type,
            status_change_title(order.status),
            seller_text,
            order.id,
        );
        self.db.insert_notification(seller).await?;
        Ok(())
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            let event = OrderCreatedEvent { order: order.clone() };
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_delivered_hook(&self, order: &Order) {
        for emitter in &self.producers.order_delivered_producer {
            let event = OrderDeliveredEvent { order: order.clone() };
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_completed_hook(&self, order: &Order, auto_approved: bool) {
        for emitter in &self.producers.order_completed_producer {
            let event = OrderCompletedEvent { order: order.clone(), auto_approved };
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

fn validate_new_order(request: &NewOrderRequest) -> Result<(), OrderFlowError> {
    for (field, value) in
        [("buyer_id", &request.buyer_id), ("seller_id", &request.seller_id), ("product_id", &request.product_id)]
    {
        if value.trim().is_empty() {
            return Err(OrderFlowError::ValidationError(format!("{field} must not be empty")));
        }
    }
    if request.quantity < 1 {
        return Err(OrderFlowError::ValidationError(format!("quantity must be at least 1, got {}", request.quantity)));
    }
    if request.unit_price.is_negative() || request.total_price.is_negative() || request.service_fee.is_negative() {
        return Err(OrderFlowError::ValidationError("monetary fields must not be negative".to_string()));
    }
    Ok(())
}

fn status_change_title(status: OrderStatusType) -> &'static str {
    match status {
        OrderStatusType::Pending => "Order Placed",
        OrderStatusType::Confirmed => "Order Confirmed",
        OrderStatusType::InProgress => "Order In Progress",
        OrderStatusType::RevisionRequested => "Revision Requested",
        OrderStatusType::Delivered => "Order Delivered",
        OrderStatusType::Completed => "Order Completed",
        OrderStatusType::Cancelled => "Order Cancelled",
        OrderStatusType::Refunded => "Order Refunded",
        OrderStatusType::Disputed => "Order Disputed",
    }
}

fn status_change_wording(order: &Order) -> (String, String) {
    let n = &order.order_number;
    match order.status {
        OrderStatusType::Confirmed => {
            (format!("The seller has accepted order {n}."), format!("You accepted order {n}."))
        },
        OrderStatusType::InProgress => {
            (format!("Work on order {n} has started."), format!("Order {n} is marked as in progress."))
        },
        OrderStatusType::RevisionRequested => {
            (format!("Your revision request for order {n} was recorded."), format!("The buyer requested a revision on order {n}."))
        },
        OrderStatusType::Delivered => (
            format!("Order {n} has been delivered. Review it before the approval deadline."),
            format!("You delivered order {n}. The buyer's approval window has started."),
        ),
        OrderStatusType::Completed => (
            format!("Order {n} has been completed."),
            format!("Order {n} was completed. The funds are now available for withdrawal."),
        ),
        OrderStatusType::Cancelled => {
            (format!("Order {n} was cancelled."), format!("Order {n} was cancelled."))
        },
        OrderStatusType::Refunded => {
            (format!("Order {n} was refunded."), format!("Order {n} was refunded."))
        },
        OrderStatusType::Disputed => {
            (format!("A dispute was opened on order {n}."), format!("A dispute was opened on order {n}."))
        },
        OrderStatusType::Pending => {
            (format!("Order {n} was placed."), format!("You have a new order {n}."))
        },
    }
}
