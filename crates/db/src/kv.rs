//! Redis-backed store.
//!
//! Layout:
//! - `channel:{id}` holds the channel record as JSON, written with `SETNX`.
//! - `channel:{id}:subscriptions` is a hash of subscription id to JSON.
//! - `channel:{id}:messages` is a list of message JSON in append order.
//! - `messages:seq` hands out message ids.

use async_trait::async_trait;
use chrono::Utc;
use notify_core::error::{StoreError, StoreResult};
use notify_core::store::NotifyStore;
use notify_core::types::{Channel, DeliveryResult, Message, MessageData, MessageId, Subscription};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashMap;

use crate::models::ChannelRecord;

const MESSAGE_SEQ_KEY: &str = "messages:seq";

fn channel_key(channel_id: &str) -> String {
    format!("channel:{}", channel_id)
}

fn subscriptions_key(channel_id: &str) -> String {
    format!("channel:{}:subscriptions", channel_id)
}

fn messages_key(channel_id: &str) -> String {
    format!("channel:{}:messages", channel_id)
}

#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub async fn open(redis_url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(redis_url).map_err(StoreError::backend)?;
        let store = Self { client };
        store.conn().await?;
        Ok(store)
    }

    async fn conn(&self) -> StoreResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(StoreError::backend)
    }

    async fn require_channel(
        &self,
        conn: &mut MultiplexedConnection,
        channel_id: &str,
    ) -> StoreResult<()> {
        let exists: bool = conn
            .exists(channel_key(channel_id))
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
impl NotifyStore for RedisStore {
    async fn insert_channel(&self, channel: &Channel) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let record = serde_json::to_string(&ChannelRecord::from(channel))?;
        conn.set_nx(channel_key(&channel.id), record)
            .await
            .map_err(StoreError::backend)
    }

    async fn get_channel(&self, channel_id: &str) -> StoreResult<Channel> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(channel_key(channel_id))
            .await
            .map_err(StoreError::backend)?;
        let raw = raw.ok_or_else(|| StoreError::NoSuchChannel(channel_id.to_string()))?;
        let record: ChannelRecord = serde_json::from_str(&raw)?;

        let entries: HashMap<String, String> = conn
            .hgetall(subscriptions_key(channel_id))
            .await
            .map_err(StoreError::backend)?;
        let subscriptions = entries
            .values()
            .map(|raw| serde_json::from_str::<Subscription>(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(record.into_channel(subscriptions))
    }

    async fn add_subscription(
        &self,
        channel_id: &str,
        subscription: &Subscription,
    ) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        self.require_channel(&mut conn, channel_id).await?;
        let raw = serde_json::to_string(subscription)?;
        let _: () = conn
            .hset(subscriptions_key(channel_id), &subscription.id, raw)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn remove_subscription(
        &self,
        channel_id: &str,
        subscription_id: &str,
    ) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn
            .hdel(subscriptions_key(channel_id), subscription_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn put_message(
        &self,
        channel_id: &str,
        content: &str,
        data: &MessageData,
        delivery_result: &DeliveryResult,
    ) -> StoreResult<MessageId> {
        let mut conn = self.conn().await?;
        self.require_channel(&mut conn, channel_id).await?;

        let id: i64 = conn
            .incr(MESSAGE_SEQ_KEY, 1)
            .await
            .map_err(StoreError::backend)?;
        let message = Message {
            id,
            channel_id: channel_id.to_string(),
            content: content.to_string(),
            data: data.clone(),
            delivery_result: delivery_result.clone(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_string(&message)?;
        let _: () = conn
            .rpush(messages_key(channel_id), raw)
            .await
            .map_err(StoreError::backend)?;
        Ok(id)
    }

    async fn get_messages(&self, channel_id: &str) -> StoreResult<Vec<Message>> {
        let mut conn = self.conn().await?;
        self.require_channel(&mut conn, channel_id).await?;
        let raw: Vec<String> = conn
            .lrange(messages_key(channel_id), 0, -1)
            .await
            .map_err(StoreError::backend)?;
        raw.iter()
            .map(|entry| serde_json::from_str::<Message>(entry).map_err(StoreError::from))
            .collect()
    }
}
