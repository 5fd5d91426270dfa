use async_trait::async_trait;
use notify_core::error::{StoreError, StoreResult};
use notify_core::store::NotifyStore;
use notify_core::types::{Channel, DeliveryResult, Message, MessageData, MessageId, Subscription};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::queries;

const SCHEMA: &str = include_str!("schema.sql");

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(StoreError::backend)?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they don't exist yet. Safe to run on every start.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        info!("postgres schema ready");
        Ok(())
    }

    async fn require_channel(&self, channel_id: &str) -> StoreResult<()> {
        let exists = queries::channels::exists(&self.pool, channel_id)
            .await
            .map_err(StoreError::backend)?;
        if exists {
            Ok(())
        } else {
            Err(StoreError::NoSuchChannel(channel_id.to_string()))
        }
    }
}

#[async_trait]
impl NotifyStore for PgStore {
    async fn insert_channel(&self, channel: &Channel) -> StoreResult<bool> {
        queries::channels::insert_if_absent(
            &self.pool,
            &channel.id,
            &channel.created_meta,
            channel.created_at,
        )
        .await
        .map_err(StoreError::backend)
    }

    async fn get_channel(&self, channel_id: &str) -> StoreResult<Channel> {
        let row = queries::channels::get_by_id(&self.pool, channel_id)
            .await
            .map_err(StoreError::backend)?
            .ok_or_else(|| StoreError::NoSuchChannel(channel_id.to_string()))?;
        let subscriptions = queries::subscriptions::list_by_channel(&self.pool, channel_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.into_channel(subscriptions))
    }

    async fn add_subscription(
        &self,
        channel_id: &str,
        subscription: &Subscription,
    ) -> StoreResult<()> {
        let written = queries::subscriptions::upsert(&self.pool, channel_id, subscription)
            .await
            .map_err(StoreError::backend)?;
        if written {
            Ok(())
        } else {
            Err(StoreError::NoSuchChannel(channel_id.to_string()))
        }
    }

    async fn remove_subscription(
        &self,
        channel_id: &str,
        subscription_id: &str,
    ) -> StoreResult<()> {
        queries::subscriptions::delete(&self.pool, channel_id, subscription_id)
            .await
            .map_err(StoreError::backend)
    }

    async fn put_message(
        &self,
        channel_id: &str,
        content: &str,
        data: &MessageData,
        delivery_result: &DeliveryResult,
    ) -> StoreResult<MessageId> {
        queries::messages::insert(&self.pool, channel_id, content, data, delivery_result)
            .await
            .map_err(StoreError::backend)?
            .ok_or_else(|| StoreError::NoSuchChannel(channel_id.to_string()))
    }

    async fn get_messages(&self, channel_id: &str) -> StoreResult<Vec<Message>> {
        self.require_channel(channel_id).await?;
        let rows = queries::messages::list_by_channel(&self.pool, channel_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}
