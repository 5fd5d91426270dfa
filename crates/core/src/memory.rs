use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::NotifyStore;
use crate::types::{Channel, DeliveryResult, Message, MessageData, MessageId, Subscription};

#[derive(Debug)]
struct ChannelEntry {
    channel: Channel,
    messages: Vec<Message>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    channels: RwLock<HashMap<String, ChannelEntry>>,
    next_message_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[async_trait]
impl NotifyStore for MemoryStore {
    async fn insert_channel(&self, channel: &Channel) -> StoreResult<bool> {
        let mut channels = self.channels.write().await;
        if channels.contains_key(&channel.id) {
            return Ok(false);
        }
        channels.insert(
            channel.id.clone(),
            ChannelEntry {
                channel: channel.clone(),
                messages: Vec::new(),
            },
        );
        Ok(true)
    }

    async fn get_channel(&self, channel_id: &str) -> StoreResult<Channel> {
        self.channels
            .read()
            .await
            .get(channel_id)
            .map(|entry| entry.channel.clone())
            .ok_or_else(|| StoreError::NoSuchChannel(channel_id.to_string()))
    }

    async fn add_subscription(
        &self,
        channel_id: &str,
        subscription: &Subscription,
    ) -> StoreResult<()> {
        let mut channels = self.channels.write().await;
        let entry = channels
            .get_mut(channel_id)
            .ok_or_else(|| StoreError::NoSuchChannel(channel_id.to_string()))?;
        entry
            .channel
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(())
    }

    async fn remove_subscription(
        &self,
        channel_id: &str,
        subscription_id: &str,
    ) -> StoreResult<()> {
        if let Some(entry) = self.channels.write().await.get_mut(channel_id) {
            entry.channel.subscriptions.remove(subscription_id);
        }
        Ok(())
    }

    async fn put_message(
        &self,
        channel_id: &str,
        content: &str,
        data: &MessageData,
        delivery_result: &DeliveryResult,
    ) -> StoreResult<MessageId> {
        let mut channels = self.channels.write().await;
        let entry = channels
            .get_mut(channel_id)
            .ok_or_else(|| StoreError::NoSuchChannel(channel_id.to_string()))?;

        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        entry.messages.push(Message {
            id,
            channel_id: channel_id.to_string(),
            content: content.to_string(),
            data: data.clone(),
            delivery_result: delivery_result.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get_messages(&self, channel_id: &str) -> StoreResult<Vec<Message>> {
        self.channels
            .read()
            .await
            .get(channel_id)
            .map(|entry| entry.messages.clone())
            .ok_or_else(|| StoreError::NoSuchChannel(channel_id.to_string()))
    }
}
