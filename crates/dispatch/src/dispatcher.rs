use futures_util::stream::{self, StreamExt};
use notify_core::config::Settings;
use notify_core::registry::ChannelRegistry;
use notify_core::types::{
    DeliveryOutcome, DeliveryResult, MessageData, PresentationOptions, Subscription,
    SubscriptionId,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::transport::{classify, PushError, PushTransport};

#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Push attempts in flight at once for a single message.
    pub max_concurrency: usize,
    pub attempt_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 32,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl DispatchConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_concurrency: settings.dispatch_concurrency,
            attempt_timeout: settings.push_timeout,
        }
    }
}

/// What gets pushed to every subscription of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub content: String,
    pub data: MessageData,
    pub presentation: PresentationOptions,
}

impl Notification {
    /// A missing or empty action falls back to the channel page.
    pub fn new(
        content: impl Into<String>,
        action: Option<String>,
        page_url: &str,
        presentation: PresentationOptions,
    ) -> Self {
        let action = action
            .filter(|action| !action.is_empty())
            .unwrap_or_else(|| page_url.to_string());
        Self {
            content: content.into(),
            data: MessageData {
                action: Some(action),
            },
            presentation,
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut payload = json!({
            "message": self.content,
            "data": self.data,
        });

        if let Some(pattern) = self.presentation.vibrate_pattern() {
            payload["vibrate"] = json!(pattern);
        }
        if self.presentation.silent {
            payload["silent"] = json!(true);
        }

        payload.to_string().into_bytes()
    }
}

/// Fans a notification out to a channel's subscriptions.
///
/// Attempts run concurrently up to `max_concurrency`, each bounded by
/// `attempt_timeout`. A failing attempt never affects the others.
/// Subscriptions whose push service reports them gone are removed from
/// the channel before `dispatch` returns.
#[derive(Clone)]
pub struct Dispatcher {
    registry: ChannelRegistry,
    transport: Arc<dyn PushTransport>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        registry: ChannelRegistry,
        transport: Arc<dyn PushTransport>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            config,
        }
    }

    pub async fn dispatch(
        &self,
        channel_id: &str,
        subscriptions: &BTreeMap<SubscriptionId, Subscription>,
        notification: &Notification,
    ) -> DeliveryResult {
        if subscriptions.is_empty() {
            debug!(%channel_id, "no subscriptions to notify");
            return DeliveryResult::new();
        }

        let start = Instant::now();
        let payload: Arc<[u8]> = notification.payload().into();
        let shared_id: Arc<str> = channel_id.into();

        // Attempts own their inputs; the fan-out future must be `Send`.
        let attempts: Vec<_> = subscriptions
            .values()
            .cloned()
            .map(|subscription| {
                let dispatcher = self.clone();
                let channel_id = Arc::clone(&shared_id);
                let payload = Arc::clone(&payload);
                async move {
                    let outcome = dispatcher
                        .attempt(&channel_id, &subscription, &payload)
                        .await;
                    (subscription.id, outcome)
                }
            })
            .collect();

        let result: DeliveryResult = stream::iter(attempts)
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let count = |wanted: DeliveryOutcome| result.values().filter(|o| **o == wanted).count();
        info!(
            %channel_id,
            subscriptions = result.len(),
            delivered = count(DeliveryOutcome::Delivered),
            expired = count(DeliveryOutcome::Expired),
            failed = count(DeliveryOutcome::Failed),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dispatched message"
        );

        result
    }

    async fn attempt(
        &self,
        channel_id: &str,
        subscription: &Subscription,
        payload: &[u8],
    ) -> DeliveryOutcome {
        let timeout = self.config.attempt_timeout;
        let result = match tokio::time::timeout(timeout, self.transport.send(subscription, payload))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PushError::Timeout(timeout)),
        };

        let outcome = classify(&result);
        match (&outcome, result) {
            (DeliveryOutcome::Expired, _) => {
                if let Err(err) = self.registry.prune(channel_id, &subscription.id).await {
                    warn!(%channel_id, subscription_id = %subscription.id, error = %err, "failed to prune expired subscription");
                }
            }
            (DeliveryOutcome::Failed, Err(err)) => {
                warn!(%channel_id, subscription_id = %subscription.id, error = %err, "push delivery failed");
            }
            _ => {}
        }

        outcome
    }
}
