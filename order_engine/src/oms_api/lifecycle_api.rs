use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{NewMessage, NewNotification, Order, OrderStatusType},
    events::{EventProducers, OrderCompletedEvent},
    oms_api::errors::OrderFlowError,
    traits::{OrderStore, StatusStamps, SweepResult},
};

/// First words of the auto-approval audit message. Matched case-insensitively when checking
/// whether an order's completion was already announced.
pub const AUTO_APPROVAL_PREFIX: &str = "Order automatically completed";

/// Notification type tag for completions, automatic or human.
pub const ORDER_COMPLETED_NOTIFICATION: &str = "order_completed";

/// Upper bound on orders taken per sweep pass. A backlog larger than this drains across
/// consecutive passes instead of in one unbounded batch.
const SWEEP_BATCH_LIMIT: i64 = 500;

/// `LifecycleApi` is the sweeper: invoked on a schedule, it finds delivered orders whose buyer
/// approval deadline has lapsed and promotes them to completed.
pub struct LifecycleApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for LifecycleApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LifecycleApi")
    }
}

impl<B> LifecycleApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> LifecycleApi<B>
where B: OrderStore
{
    /// Run one sweep pass over orders stuck in `delivered` past their `approve_by` deadline.
    ///
    /// Each matching order is handled independently: the conditional update from `delivered` to
    /// `completed` is attempted, and if it reports the order was no longer `delivered` (a human
    /// action got there first) the order is skipped silently — a lost race, not an error. On a
    /// successful transition exactly one audit message and one notification per party are
    /// written, each behind an existence check so that overlapping or repeated sweeps converge.
    ///
    /// A failure while processing one order is logged and that order excluded from the result;
    /// the rest of the batch continues. A failure of the initial scan is fatal for the
    /// invocation and propagates to the scheduler so it can alert and retry on the next tick.
    pub async fn sweep_overdue_approvals(&self) -> Result<SweepResult, OrderFlowError> {
        let now = Utc::now();
        let due = self.db.fetch_orders_in_status_before(OrderStatusType::Delivered, now, SWEEP_BATCH_LIMIT).await?;
        debug!("🕰️ {} orders are past their approval deadline", due.len());
        let mut result = SweepResult::default();
        for order in due {
            match self.complete_order(&order, now).await {
                Ok(Some(completed)) => {
                    info!("🕰️ Order {} auto-completed", completed.order_number);
                    self.call_order_completed_hook(&completed).await;
                    result.processed.push(completed.id);
                },
                Ok(None) => {
                    debug!("🕰️ Order {} left the delivered status while sweeping. Skipping.", order.order_number);
                },
                Err(e) => {
                    error!("🕰️ Could not auto-complete order {}: {e}", order.order_number);
                },
            }
        }
        info!("🕰️ Sweep complete. {} orders auto-completed", result.count());
        Ok(result)
    }

    /// Promote one overdue order. `Ok(None)` means the conditional update lost its race.
    async fn complete_order(&self, order: &Order, now: DateTime<Utc>) -> Result<Option<Order>, OrderFlowError> {
        let stamps = StatusStamps::completed(now);
        let updated = match self
            .db
            .update_order_status(order.id, &[OrderStatusType::Delivered], OrderStatusType::Completed, stamps)
            .await?
        {
            Some(updated) => updated,
            None => return Ok(None),
        };

        if !self.db.system_message_exists_with_prefix(order.id, AUTO_APPROVAL_PREFIX).await? {
            let text = format!(
                "{AUTO_APPROVAL_PREFIX}: the approval window for order {} ended with no buyer action.",
                updated.order_number
            );
            let message = NewMessage::system(order.id, updated.seller_id.clone(), text);
            self.db.insert_message(message).await?;
        }
        if !self.db.notification_exists(&updated.buyer_id, ORDER_COMPLETED_NOTIFICATION, order.id).await? {
            let notification = NewNotification::for_order(
                updated.buyer_id.clone(),
                ORDER_COMPLETED_NOTIFICATION,
                "Order Completed",
                format!("Order {} has been automatically marked as completed.", updated.order_number),
                order.id,
            );
            self.db.insert_notification(notification).await?;
        }
        if !self.db.notification_exists(&updated.seller_id, ORDER_COMPLETED_NOTIFICATION, order.id).await? {
            let notification = NewNotification::for_order(
                updated.seller_id.clone(),
                ORDER_COMPLETED_NOTIFICATION,
                "Order Completed",
                format!(
                    "Order {} was auto-approved. The funds are now available for withdrawal.",
                    updated.order_number
                ),
                order.id,
            );
            self.db.insert_notification(notification).await?;
        }
        Ok(Some(updated))
    }

    async fn call_order_completed_hook(&self, order: &Order) {
        for emitter in &self.producers.order_completed_producer {
            let event = OrderCompletedEvent { order: order.clone(), auto_approved: true };
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
