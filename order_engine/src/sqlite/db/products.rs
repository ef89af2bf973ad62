use sqlx::SqliteConnection;

use crate::{db_types::ProductDelivery, traits::OrderStoreError};

pub async fn fetch_product_delivery(
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductDelivery>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE product_id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Creates or replaces a product's delivery inputs. The catalogue service owns this data; the
/// order engine only ever reads it back.
pub async fn upsert_product_delivery(
    product: ProductDelivery,
    conn: &mut SqliteConnection,
) -> Result<(), OrderStoreError> {
    sqlx::query(
        r#"
            INSERT INTO products (
                product_id, seller_id, title, digital_files, course_links, course_passkeys, course_notes, auto_deliver
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (product_id) DO UPDATE SET
                seller_id = excluded.seller_id,
                title = excluded.title,
                digital_files = excluded.digital_files,
                course_links = excluded.course_links,
                course_passkeys = excluded.course_passkeys,
                course_notes = excluded.course_notes,
                auto_deliver = excluded.auto_deliver
        "#,
    )
    .bind(product.product_id)
    .bind(product.seller_id)
    .bind(product.title)
    .bind(product.digital_files)
    .bind(product.course_links)
    .bind(product.course_passkeys)
    .bind(product.course_notes)
    .bind(product.auto_deliver)
    .execute(conn)
    .await?;
    Ok(())
}
