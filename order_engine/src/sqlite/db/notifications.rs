use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewNotification, Notification},
    traits::OrderStoreError,
};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, OrderStoreError> {
    let notification: Notification = sqlx::query_as(
        r#"
            INSERT INTO notifications (user_id, notification_type, title, message, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.notification_type)
    .bind(notification.title)
    .bind(notification.message)
    .bind(Json(notification.data))
    .fetch_one(conn)
    .await?;
    Ok(notification)
}

/// Whether the user was already told about this order with this type tag. The order id lives in
/// the JSON data payload, so the check goes through `json_extract`.
pub async fn notification_exists(
    user_id: &str,
    notification_type: &str,
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, OrderStoreError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM notifications
        WHERE user_id = $1 AND notification_type = $2 AND json_extract(data, '$.order_id') = $3
        "#,
    )
    .bind(user_id)
    .bind(notification_type)
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

pub async fn fetch_notifications_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications =
        sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(notifications)
}
