use chrono::{DateTime, Utc};
use notify_core::types::{
    Channel, DeliveryResult, Message, MessageData, RegistrantMeta, Subscription, SubscriptionKeys,
};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ChannelRow {
    pub id: String,
    pub created_meta: Json<RegistrantMeta>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub channel_id: String,
    pub id: String,
    pub endpoint: String,
    pub keys: Json<SubscriptionKeys>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub channel_id: String,
    pub content: String,
    pub data: Json<MessageData>,
    pub delivery_result: Json<DeliveryResult>,
    pub created_at: DateTime<Utc>,
}

/// Channel as stored in the key-value backend; subscriptions live under
/// their own key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub created_meta: RegistrantMeta,
    pub created_at: DateTime<Utc>,
}

impl ChannelRow {
    pub fn into_channel(self, subscriptions: Vec<SubscriptionRow>) -> Channel {
        Channel {
            id: self.id,
            created_meta: self.created_meta.0,
            created_at: self.created_at,
            subscriptions: subscriptions
                .into_iter()
                .map(Subscription::from)
                .map(|sub| (sub.id.clone(), sub))
                .collect(),
        }
    }
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            endpoint: row.endpoint,
            keys: row.keys.0,
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            channel_id: row.channel_id,
            content: row.content,
            data: row.data.0,
            delivery_result: row.delivery_result.0,
            created_at: row.created_at,
        }
    }
}

impl From<&Channel> for ChannelRecord {
    fn from(channel: &Channel) -> Self {
        ChannelRecord {
            id: channel.id.clone(),
            created_meta: channel.created_meta.clone(),
            created_at: channel.created_at,
        }
    }
}

impl ChannelRecord {
    pub fn into_channel(self, subscriptions: Vec<Subscription>) -> Channel {
        Channel {
            id: self.id,
            created_meta: self.created_meta,
            created_at: self.created_at,
            subscriptions: subscriptions
                .into_iter()
                .map(|sub| (sub.id.clone(), sub))
                .collect(),
        }
    }
}
