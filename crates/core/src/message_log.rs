use std::sync::Arc;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::registry::ChannelRegistry;
use crate::store::NotifyStore;
use crate::types::{DeliveryResult, Message, MessageData, MessageId};

/// Append-only message history per channel.
#[derive(Clone)]
pub struct MessageLog {
    store: Arc<dyn NotifyStore>,
}

impl MessageLog {
    pub fn new(store: Arc<dyn NotifyStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        channel_id: &str,
        content: &str,
        data: &MessageData,
        delivery_result: &DeliveryResult,
    ) -> StoreResult<MessageId> {
        ChannelRegistry::check_id(channel_id)?;
        StoreError::check_content(content)?;
        let message_id = self
            .store
            .put_message(channel_id, content, data, delivery_result)
            .await?;
        debug!(%channel_id, message_id, "recorded message");
        Ok(message_id)
    }

    pub async fn history(&self, channel_id: &str) -> StoreResult<Vec<Message>> {
        ChannelRegistry::check_id(channel_id)?;
        self.store.get_messages(channel_id).await
    }
}
