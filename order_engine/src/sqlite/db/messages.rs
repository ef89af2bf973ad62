use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewMessage, OrderMessage},
    traits::OrderStoreError,
};

pub async fn insert_message(message: NewMessage, conn: &mut SqliteConnection) -> Result<OrderMessage, OrderStoreError> {
    let message: OrderMessage = sqlx::query_as(
        r#"
            INSERT INTO order_messages (order_id, sender_id, message, attachments, is_system_message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(message.order_id)
    .bind(message.sender_id)
    .bind(message.message)
    .bind(Json(message.attachments))
    .bind(message.is_system_message)
    .fetch_one(conn)
    .await?;
    Ok(message)
}

/// Case-insensitive prefix check over the order's system messages. Guards the course-access and
/// auto-approval messages against duplication; the prefixes are fixed marker phrases, so no LIKE
/// wildcard escaping is needed.
pub async fn system_message_exists_with_prefix(
    order_id: i64,
    prefix: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, OrderStoreError> {
    let pattern = format!("{}%", prefix.to_ascii_lowercase());
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_messages WHERE order_id = $1 AND is_system_message = 1 AND LOWER(message) LIKE $2",
    )
    .bind(order_id)
    .bind(pattern)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

pub async fn fetch_messages_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderMessage>, sqlx::Error> {
    let messages = sqlx::query_as("SELECT * FROM order_messages WHERE order_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(messages)
}
