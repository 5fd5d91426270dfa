use notify_core::types::{
    Channel, ChannelId, DeliveryResult, Message, MessageId, PresentationOptions, RegistrantMeta,
    Subscription,
};
use notify_core::{ChannelRegistry, MessageLog, NotifyStore, StoreError, StoreResult};
use std::sync::Arc;
use tracing::info;

use crate::dispatcher::{DispatchConfig, Dispatcher, Notification};
use crate::transport::PushTransport;

/// A message as a sender submits it, before an action default is applied.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub content: String,
    pub action: Option<String>,
    pub presentation: PresentationOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: MessageId,
    pub delivery_result: DeliveryResult,
}

#[derive(Debug, Clone)]
pub struct ChannelView {
    pub channel: Channel,
    pub messages: Vec<Message>,
}

/// Channel registry, dispatcher and message log over one shared store.
#[derive(Clone)]
pub struct Relay {
    registry: ChannelRegistry,
    dispatcher: Dispatcher,
    log: MessageLog,
}

impl Relay {
    pub fn new(
        store: Arc<dyn NotifyStore>,
        transport: Arc<dyn PushTransport>,
        config: DispatchConfig,
    ) -> Self {
        let registry = ChannelRegistry::new(store.clone());
        Self {
            dispatcher: Dispatcher::new(registry.clone(), transport, config),
            log: MessageLog::new(store),
            registry,
        }
    }

    pub async fn register(&self, meta: RegistrantMeta) -> StoreResult<ChannelId> {
        self.registry.register(meta).await
    }

    pub async fn subscribe(&self, channel_id: &str, subscription: Subscription) -> StoreResult<()> {
        self.registry.subscribe(channel_id, subscription).await
    }

    pub async fn channel(&self, channel_id: &str) -> StoreResult<Channel> {
        self.registry.resolve(channel_id).await
    }

    pub async fn read(&self, channel_id: &str) -> StoreResult<ChannelView> {
        let channel = self.registry.resolve(channel_id).await?;
        let messages = self.log.history(channel_id).await?;
        Ok(ChannelView { channel, messages })
    }

    /// Deliver to every current subscription, then append the message with
    /// its per-subscription outcomes. Push failures are only reported in
    /// the result. An unknown channel or over-long content fails before
    /// anything is sent.
    pub async fn post(
        &self,
        channel_id: &str,
        message: OutgoingMessage,
        page_url: &str,
    ) -> StoreResult<PostedMessage> {
        let channel = self.registry.resolve(channel_id).await?;
        StoreError::check_content(&message.content)?;

        let notification = Notification::new(
            message.content,
            message.action,
            page_url,
            message.presentation,
        );
        let delivery_result = self
            .dispatcher
            .dispatch(channel_id, &channel.subscriptions, &notification)
            .await;

        let id = self
            .log
            .record(
                channel_id,
                &notification.content,
                &notification.data,
                &delivery_result,
            )
            .await?;

        info!(%channel_id, message_id = id, recipients = delivery_result.len(), "posted message");
        Ok(PostedMessage {
            id,
            delivery_result,
        })
    }
}
