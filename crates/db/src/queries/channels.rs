use crate::models::ChannelRow;
use chrono::{DateTime, Utc};
use notify_core::types::RegistrantMeta;
use sqlx::types::Json;
use sqlx::PgPool;

/// Insert a channel unless the id is taken. Returns whether a row was written.
pub async fn insert_if_absent(
    pool: &PgPool,
    id: &str,
    created_meta: &RegistrantMeta,
    created_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO channels (id, created_meta, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(Json(created_meta))
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn get_by_id(pool: &PgPool, id: &str) -> Result<Option<ChannelRow>, sqlx::Error> {
    sqlx::query_as::<_, ChannelRow>(
        r#"
        SELECT id, created_meta, created_at
        FROM channels
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM channels WHERE id = $1)
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}
