use chrono::{DateTime, Utc};
use mockall::mock;
use order_engine::{
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
    order_objects::OrderQueryFilter,
    traits::{OrderStore, OrderStoreError, StatusStamps, UserRole},
};

mock! {
    pub OrderStoreBackend {}

    impl Clone for OrderStoreBackend {
        fn clone(&self) -> Self;
    }

    impl OrderStore for OrderStoreBackend {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError>;
        async fn update_order_status(
            &self,
            id: i64,
            expected: &[OrderStatusType],
            new_status: OrderStatusType,
            stamps: StatusStamps,
        ) -> Result<Option<Order>, OrderStoreError>;
        async fn update_payment_status(&self, id: i64, status: PaymentStatusType) -> Result<Order, OrderStoreError>;
        async fn fetch_orders_for_user(&self, user_id: &str, role: UserRole) -> Result<Vec<Order>, OrderStoreError>;
        async fn fetch_orders_in_status_before(
            &self,
            status: OrderStatusType,
            cutoff: DateTime<Utc>,
            limit: i64,
        ) -> Result<Vec<Order>, OrderStoreError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError>;
        async fn insert_deliverable(&self, deliverable: NewDeliverable) -> Result<OrderDeliverable, OrderStoreError>;
        async fn deliverable_exists_with_description(
            &self,
            order_id: i64,
            description: &str,
        ) -> Result<bool, OrderStoreError>;
        async fn fetch_deliverables_for_order(&self, order_id: i64) -> Result<Vec<OrderDeliverable>, OrderStoreError>;
        async fn insert_message(&self, message: NewMessage) -> Result<OrderMessage, OrderStoreError>;
        async fn system_message_exists_with_prefix(&self, order_id: i64, prefix: &str) -> Result<bool, OrderStoreError>;
        async fn fetch_messages_for_order(&self, order_id: i64) -> Result<Vec<OrderMessage>, OrderStoreError>;
        async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, OrderStoreError>;
        async fn notification_exists(
            &self,
            user_id: &str,
            notification_type: &str,
            order_id: i64,
        ) -> Result<bool, OrderStoreError>;
        async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, OrderStoreError>;
        async fn fetch_product_delivery(&self, product_id: &str) -> Result<Option<ProductDelivery>, OrderStoreError>;
        async fn upsert_product_delivery(&self, product: ProductDelivery) -> Result<(), OrderStoreError>;
    }
}
