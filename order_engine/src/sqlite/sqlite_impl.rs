//! `SqliteOrderStore` is the concrete SQLite implementation of the order engine backend.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::db::{deliverables, messages, new_pool, notifications, orders, products};
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
    traits::{OrderStore, OrderStoreError, StatusStamps, UserRole},
};

#[derive(Clone)]
pub struct SqliteOrderStore {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteOrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteOrderStore ({:?})", self.pool)
    }
}

impl SqliteOrderStore {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, OrderStoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderStore for SqliteOrderStore {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: i64,
        expected: &[OrderStatusType],
        new_status: OrderStatusType,
        stamps: StatusStamps,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(id, expected, new_status, stamps, &mut conn).await
    }

    async fn update_payment_status(&self, id: i64, status: PaymentStatusType) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_payment_status(id, status, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: &str, role: UserRole) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, role, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_in_status_before(
        &self,
        status: OrderStatusType,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_in_status_before(status, cutoff, limit, &mut conn).await?;
        Ok(orders)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn insert_deliverable(&self, deliverable: NewDeliverable) -> Result<OrderDeliverable, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        deliverables::insert_deliverable(deliverable, &mut conn).await
    }

    async fn deliverable_exists_with_description(
        &self,
        order_id: i64,
        description: &str,
    ) -> Result<bool, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        deliverables::deliverable_exists_with_description(order_id, description, &mut conn).await
    }

    async fn fetch_deliverables_for_order(&self, order_id: i64) -> Result<Vec<OrderDeliverable>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let deliverables = deliverables::fetch_deliverables_for_order(order_id, &mut conn).await?;
        Ok(deliverables)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<OrderMessage, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        messages::insert_message(message, &mut conn).await
    }

    async fn system_message_exists_with_prefix(&self, order_id: i64, prefix: &str) -> Result<bool, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        messages::system_message_exists_with_prefix(order_id, prefix, &mut conn).await
    }

    async fn fetch_messages_for_order(&self, order_id: i64) -> Result<Vec<OrderMessage>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let messages = messages::fetch_messages_for_order(order_id, &mut conn).await?;
        Ok(messages)
    }

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        notifications::insert_notification(notification, &mut conn).await
    }

    async fn notification_exists(
        &self,
        user_id: &str,
        notification_type: &str,
        order_id: i64,
    ) -> Result<bool, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        notifications::notification_exists(user_id, notification_type, order_id, &mut conn).await
    }

    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let notifications = notifications::fetch_notifications_for_user(user_id, &mut conn).await?;
        Ok(notifications)
    }

    async fn fetch_product_delivery(&self, product_id: &str) -> Result<Option<ProductDelivery>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product_delivery(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn upsert_product_delivery(&self, product: ProductDelivery) -> Result<(), OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        products::upsert_product_delivery(product, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), OrderStoreError> {
        self.pool.close().await;
        Ok(())
    }
}
