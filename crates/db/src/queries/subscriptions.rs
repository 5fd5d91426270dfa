use crate::models::SubscriptionRow;
use notify_core::types::Subscription;
use sqlx::types::Json;
use sqlx::PgPool;

/// Insert or refresh a subscription. Returns `false` when the channel does
/// not exist and nothing was written.
pub async fn upsert(
    pool: &PgPool,
    channel_id: &str,
    subscription: &Subscription,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO subscriptions (channel_id, id, endpoint, keys)
        SELECT $1, $2, $3, $4
        WHERE EXISTS (SELECT 1 FROM channels WHERE id = $1)
        ON CONFLICT (channel_id, id) DO UPDATE
            SET endpoint = EXCLUDED.endpoint,
                keys = EXCLUDED.keys,
                updated_at = now()
        "#,
    )
    .bind(channel_id)
    .bind(&subscription.id)
    .bind(&subscription.endpoint)
    .bind(Json(&subscription.keys))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn delete(pool: &PgPool, channel_id: &str, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM subscriptions
        WHERE channel_id = $1 AND id = $2
        "#,
    )
    .bind(channel_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_by_channel(
    pool: &PgPool,
    channel_id: &str,
) -> Result<Vec<SubscriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, SubscriptionRow>(
        r#"
        SELECT channel_id, id, endpoint, keys
        FROM subscriptions
        WHERE channel_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await
}
