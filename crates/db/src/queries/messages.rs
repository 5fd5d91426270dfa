//! Message history. Rows are only ever inserted; `id` order is append order.

use crate::models::MessageRow;
use notify_core::types::{DeliveryResult, MessageData};
use sqlx::types::Json;
use sqlx::PgPool;

/// Append a message. Returns `None` when the channel does not exist.
pub async fn insert(
    pool: &PgPool,
    channel_id: &str,
    content: &str,
    data: &MessageData,
    delivery_result: &DeliveryResult,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO messages (channel_id, content, data, delivery_result)
        SELECT $1, $2, $3, $4
        WHERE EXISTS (SELECT 1 FROM channels WHERE id = $1)
        RETURNING id
        "#,
    )
    .bind(channel_id)
    .bind(content)
    .bind(Json(data))
    .bind(Json(delivery_result))
    .fetch_optional(pool)
    .await
}

pub async fn list_by_channel(
    pool: &PgPool,
    channel_id: &str,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, channel_id, content, data, delivery_result, created_at
        FROM messages
        WHERE channel_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await
}
