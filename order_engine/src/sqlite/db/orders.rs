use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatusType, PaymentStatusType},
    oms_api::order_objects::OrderQueryFilter,
    traits::{OrderStoreError, StatusStamps, UserRole},
};

/// Inserts a new order using the given connection. This is not atomic on its own; embed the call
/// inside a transaction and pass `&mut *tx` if you need atomicity with other writes.
///
/// The database enforces order-number uniqueness; a collision surfaces as
/// [`OrderStoreError::DuplicateOrderNumber`] so the caller can regenerate and retry.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let order_number = order.order_number.clone();
    let result: Result<Order, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                buyer_id,
                seller_id,
                product_id,
                package_id,
                quantity,
                unit_price,
                total_price,
                service_fee,
                expected_delivery,
                requirements,
                special_instructions,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *;
        "#,
    )
    .bind(order.order_number)
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(order.product_id)
    .bind(order.package_id)
    .bind(order.quantity)
    .bind(order.unit_price)
    .bind(order.total_price)
    .bind(order.service_fee)
    .bind(order.expected_delivery)
    .bind(Json(order.requirements))
    .bind(order.special_instructions)
    .bind(Utc::now())
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => {
            debug!("📝️ Order {} inserted with id {}", order.order_number, order.id);
            Ok(order)
        },
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(OrderStoreError::DuplicateOrderNumber(order_number))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Conditionally moves an order to `new_status`, stamping any timestamps supplied in `stamps`.
///
/// The write only lands if the order's current status is one of `expected`; `None` means the
/// precondition failed (the caller lost a race) and nothing was changed. This is the single
/// mutual-exclusion point for every writer that touches `status`.
pub(crate) async fn update_order_status(
    id: i64,
    expected: &[OrderStatusType],
    new_status: OrderStatusType,
    stamps: StatusStamps,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderStoreError> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, status = ");
    builder.push_bind(new_status.to_string());
    if let Some(at) = stamps.delivered_at {
        builder.push(", delivered_at = ");
        builder.push_bind(at);
    }
    if let Some(at) = stamps.completed_at {
        builder.push(", completed_at = ");
        builder.push_bind(at);
    }
    if let Some(at) = stamps.approve_by {
        builder.push(", approve_by = ");
        builder.push_bind(at);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    if !expected.is_empty() {
        let statuses = expected.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        builder.push(format!(" AND status IN ({statuses})"));
    }
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Order::from_row(&row)).transpose()?;
    trace!("📝️ Result of update_order_status: {res:?}");
    Ok(res)
}

/// Updates the payment axis only. Fulfillment status is untouched.
pub(crate) async fn update_payment_status(
    id: i64,
    status: PaymentStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderStoreError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status.to_string())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(OrderStoreError::OrderNotFound(id))
}

pub async fn fetch_orders_for_user(
    user_id: &str,
    role: UserRole,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let sql = match role {
        UserRole::Buyer => "SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC",
        UserRole::Seller => "SELECT * FROM orders WHERE seller_id = $1 ORDER BY created_at DESC",
    };
    let orders = sqlx::query_as(sql).bind(user_id).fetch_all(conn).await?;
    Ok(orders)
}

/// The sweeper's scan: orders in the given status whose approval deadline has passed, oldest
/// first. `datetime()` normalizes the stored and bound timestamp formats before comparing.
pub(crate) async fn fetch_orders_in_status_before(
    status: OrderStatusType,
    cutoff: DateTime<Utc>,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE status = $1 AND approve_by IS NOT NULL AND datetime(approve_by) < datetime($2)
        ORDER BY approve_by ASC
        LIMIT $3
        "#,
    )
    .bind(status.to_string())
    .bind(cutoff)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in ascending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_number) = query.order_number {
        where_clause.push("order_number = ");
        where_clause.push_bind_unseparated(order_number.to_string());
    }
    if let Some(buyer_id) = query.buyer_id {
        where_clause.push("buyer_id = ");
        where_clause.push_bind_unseparated(buyer_id);
    }
    if let Some(seller_id) = query.seller_id {
        where_clause.push("seller_id = ");
        where_clause.push_bind_unseparated(seller_id);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let mut statuses = vec![];
        query.status.as_ref().unwrap().iter().for_each(|s| {
            statuses.push(format!("'{s}'"));
        });
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    if let Some(since) = query.since {
        where_clause.push("datetime(created_at) >= datetime(");
        where_clause.push_bind_unseparated(since);
        where_clause.push_unseparated(")");
    }
    if let Some(until) = query.until {
        where_clause.push("datetime(created_at) <= datetime(");
        where_clause.push_bind_unseparated(until);
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("Result of search_orders: {:?}", orders.len());
    Ok(orders)
}
