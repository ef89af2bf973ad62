use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewDeliverable, OrderDeliverable},
    traits::OrderStoreError,
};

pub async fn insert_deliverable(
    deliverable: NewDeliverable,
    conn: &mut SqliteConnection,
) -> Result<OrderDeliverable, OrderStoreError> {
    let deliverable: OrderDeliverable = sqlx::query_as(
        r#"
            INSERT INTO order_deliverables (
                order_id, file_name, file_url, file_size, file_type, description, uploaded_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(deliverable.order_id)
    .bind(deliverable.file_name)
    .bind(deliverable.file_url)
    .bind(deliverable.file_size)
    .bind(deliverable.file_type)
    .bind(deliverable.description)
    .bind(deliverable.uploaded_by)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Deliverable {} attached to order {}", deliverable.id, deliverable.order_id);
    Ok(deliverable)
}

/// The delivery trigger's idempotence check: has the automated path already attached something
/// carrying exactly this description to the order?
pub async fn deliverable_exists_with_description(
    order_id: i64,
    description: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, OrderStoreError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM order_deliverables WHERE order_id = $1 AND description = $2")
            .bind(order_id)
            .bind(description)
            .fetch_one(conn)
            .await?;
    Ok(count > 0)
}

pub async fn fetch_deliverables_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderDeliverable>, sqlx::Error> {
    let deliverables =
        sqlx::query_as("SELECT * FROM order_deliverables WHERE order_id = $1 ORDER BY created_at ASC, id ASC")
            .bind(order_id)
            .fetch_all(conn)
            .await?;
    Ok(deliverables)
}
