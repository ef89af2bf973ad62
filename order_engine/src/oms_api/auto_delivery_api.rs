use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewDeliverable, NewMessage, ProductDelivery},
    oms_api::errors::OrderFlowError,
    traits::{DeliveryArtifact, DeliveryOutcome, OrderStore},
};

/// Description tag on deliverables written by the automatic path. Its presence on any deliverable
/// of an order means the digital files were already attached.
pub const AUTO_DELIVERY_MARKER: &str = "Automatic digital delivery";

/// First words of the course-access system message. Matched case-insensitively when checking
/// whether course information was already posted to an order thread.
pub const COURSE_ACCESS_PREFIX: &str = "Course access";

/// Fallback deliverable name for files the seller never named.
const UNNAMED_FILE: &str = "Digital download";

/// `AutoDeliveryApi` is the delivery trigger: invoked after an order is created or changes
/// status, it fulfils digital orders exactly once, however many times it is called.
pub struct AutoDeliveryApi<B> {
    db: B,
}

impl<B> Debug for AutoDeliveryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AutoDeliveryApi")
    }
}

impl<B> AutoDeliveryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AutoDeliveryApi<B>
where B: OrderStore
{
    /// Automatically fulfil a digital order.
    ///
    /// The order must exist and `product_id` must be the product the order was placed for; the
    /// caller supplying both ids is what lets a mis-wired invocation be rejected instead of
    /// silently attaching the wrong product's files.
    ///
    /// A product with no digital files, no course payload and no auto-deliver flag yields
    /// `delivered: false` without touching the order — not an error, so callers are free to
    /// invoke the trigger speculatively after every status change.
    ///
    /// Each artifact category is guarded by an existence check (deliverable description marker,
    /// system-message prefix), so a retried or concurrent invocation converges on exactly one
    /// set of attachments. The returned artifact list names what *this* call attached; an empty
    /// list on an eligible order means everything was already delivered earlier.
    pub async fn auto_deliver(&self, order_id: i64, product_id: &str) -> Result<DeliveryOutcome, OrderFlowError> {
        if product_id.trim().is_empty() {
            return Err(OrderFlowError::InvalidRequest("product_id must not be empty".to_string()));
        }
        let order = self.db.fetch_order_by_id(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if order.product_id != product_id {
            return Err(OrderFlowError::ProductMismatch { order_id, product_id: product_id.to_string() });
        }
        let product = self
            .db
            .fetch_product_delivery(product_id)
            .await?
            .ok_or_else(|| OrderFlowError::ProductNotFound(product_id.to_string()))?;
        if !product.is_auto_deliverable() {
            trace!("📦️ Product {product_id} has nothing to auto-deliver. Skipping order {order_id}.");
            return Ok(DeliveryOutcome::not_delivered());
        }

        let mut artifacts = Vec::new();
        if product.has_digital_files() && self.attach_digital_files(order_id, &product).await? {
            artifacts.push(DeliveryArtifact::DigitalFiles);
        }
        if product.has_course_payload() && self.post_course_access(order_id, &product).await? {
            artifacts.push(DeliveryArtifact::CourseInfo);
        }
        info!(
            "📦️ Auto-delivery for order {order_id}: {} artifact categories attached this call",
            artifacts.len()
        );
        Ok(DeliveryOutcome { delivered: true, artifacts })
    }

    /// Attach one deliverable per digital file, unless the marker shows this already happened.
    /// Returns whether anything was attached by this call.
    async fn attach_digital_files(&self, order_id: i64, product: &ProductDelivery) -> Result<bool, OrderFlowError> {
        if self.db.deliverable_exists_with_description(order_id, AUTO_DELIVERY_MARKER).await? {
            debug!("📦️ Order {order_id} already has its digital files. Skipping.");
            return Ok(false);
        }
        for file in &product.digital_files.0 {
            let file_name = file
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(UNNAMED_FILE)
                .to_string();
            let deliverable = NewDeliverable {
                order_id,
                file_name,
                file_url: file.url.clone(),
                file_size: file.size,
                file_type: None,
                description: Some(AUTO_DELIVERY_MARKER.to_string()),
                uploaded_by: product.seller_id.clone(),
            };
            self.db.insert_deliverable(deliverable).await?;
        }
        debug!("📦️ Attached {} digital files to order {order_id}", product.digital_files.0.len());
        Ok(true)
    }

    /// Post the course-access system message, unless one is already on the thread. Returns
    /// whether a message was posted by this call.
    async fn post_course_access(&self, order_id: i64, product: &ProductDelivery) -> Result<bool, OrderFlowError> {
        if self.db.system_message_exists_with_prefix(order_id, COURSE_ACCESS_PREFIX).await? {
            debug!("📦️ Order {order_id} already has its course access message. Skipping.");
            return Ok(false);
        }
        let text = compose_course_message(product);
        let message = NewMessage::system(order_id, product.seller_id.clone(), text);
        self.db.insert_message(message).await?;
        debug!("📦️ Posted course access message to order {order_id}");
        Ok(true)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// The course-access message: a header naming the product, then links, access codes and notes in
/// that order, with empty sections omitted.
fn compose_course_message(product: &ProductDelivery) -> String {
    let mut text = format!("{COURSE_ACCESS_PREFIX} for {}", product.title);
    if !product.course_links.0.is_empty() {
        text.push_str("\n\nCourse links:");
        for link in &product.course_links.0 {
            text.push_str(&format!("\n- {link}"));
        }
    }
    if !product.course_passkeys.0.is_empty() {
        text.push_str("\n\nAccess codes:");
        for key in &product.course_passkeys.0 {
            text.push_str(&format!("\n- {key}"));
        }
    }
    if let Some(notes) = product.course_notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        text.push_str("\n\n");
        text.push_str(notes);
    }
    text
}
