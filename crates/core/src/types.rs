use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ChannelId = String;
pub type SubscriptionId = String;
pub type MessageId = i64;

/// Outcome of delivering one message to one subscription, keyed by
/// subscription id in a [`DeliveryResult`].
pub type DeliveryResult = BTreeMap<SubscriptionId, DeliveryOutcome>;

/// Upper bound on message content, in characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Delivered,
    Expired,
    Failed,
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Expired => "expired",
            DeliveryOutcome::Failed => "failed",
        }
    }
}

/// Who registered a channel. Captured once, never updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrantMeta {
    pub ip: Option<String>,
    pub agent: Option<String>,
}

/// Key material a browser hands out with its push subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

impl Subscription {
    /// Subscriptions are identified by their push endpoint, so subscribing
    /// the same endpoint twice replaces the earlier entry.
    pub fn new(endpoint: impl Into<String>, keys: SubscriptionKeys) -> Self {
        let endpoint = endpoint.into();
        Self {
            id: endpoint.clone(),
            endpoint,
            keys,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub created_meta: RegistrantMeta,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

impl Channel {
    pub fn new(id: impl Into<ChannelId>, created_meta: RegistrantMeta) -> Self {
        Self {
            id: id.into(),
            created_meta,
            created_at: Utc::now(),
            subscriptions: BTreeMap::new(),
        }
    }

    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.subscriptions.keys().cloned().collect()
    }
}

/// Side-channel data delivered with a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Presentation hints forwarded to the push payload.
///
/// Fields only reach the payload when set: an empty vibration pattern and
/// `silent == false` are both treated as "not requested".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationOptions {
    /// Vibration pattern in milliseconds (on, off, on, ...).
    pub vibrate: Option<Vec<u32>>,
    pub silent: bool,
}

impl PresentationOptions {
    pub const DEFAULT_VIBRATION: [u32; 3] = [200, 100, 200];

    pub fn vibrate_pattern(&self) -> Option<&[u32]> {
        self.vibrate
            .as_deref()
            .filter(|pattern| pattern.iter().any(|ms| *ms > 0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub content: String,
    pub data: MessageData,
    pub delivery_result: DeliveryResult,
    pub created_at: DateTime<Utc>,
}
