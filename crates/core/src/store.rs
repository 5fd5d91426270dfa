//! Persistence contract for channels, subscriptions, and messages.
//!
//! Backends only have to guarantee three things: channel ids are unique
//! (insert-if-absent), subscription upserts and removals are atomic per key,
//! and messages come back in the order they were appended.

use async_trait::async_trait;
use tracing::debug;

use crate::channel_id::{new_channel_id, MAX_ALLOCATION_ATTEMPTS};
use crate::error::{StoreError, StoreResult};
use crate::types::{
    Channel, ChannelId, DeliveryResult, Message, MessageData, MessageId, RegistrantMeta,
    Subscription,
};

#[async_trait]
pub trait NotifyStore: Send + Sync {
    /// Insert `channel` unless its id is taken. Returns `false` on conflict.
    async fn insert_channel(&self, channel: &Channel) -> StoreResult<bool>;

    async fn get_channel(&self, channel_id: &str) -> StoreResult<Channel>;

    /// Insert or replace the subscription with the same id.
    async fn add_subscription(
        &self,
        channel_id: &str,
        subscription: &Subscription,
    ) -> StoreResult<()>;

    /// Remove a subscription. Removing an absent subscription is not an error.
    async fn remove_subscription(&self, channel_id: &str, subscription_id: &str)
        -> StoreResult<()>;

    async fn put_message(
        &self,
        channel_id: &str,
        content: &str,
        data: &MessageData,
        delivery_result: &DeliveryResult,
    ) -> StoreResult<MessageId>;

    /// All messages of a channel, oldest first.
    async fn get_messages(&self, channel_id: &str) -> StoreResult<Vec<Message>>;

    /// Allocate a fresh id and persist an empty channel under it.
    async fn register_channel(&self, meta: RegistrantMeta) -> StoreResult<ChannelId> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let channel = Channel::new(new_channel_id(), meta.clone());
            if self.insert_channel(&channel).await? {
                return Ok(channel.id);
            }
            debug!(attempt, channel_id = %channel.id, "channel id collision, retrying");
        }

        Err(StoreError::AllocationError {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Refuses the first `conflicts` inserts as if the id were taken.
    struct CollidingStore {
        conflicts: u32,
        inserts: AtomicU32,
    }

    #[async_trait]
    impl NotifyStore for CollidingStore {
        async fn insert_channel(&self, _channel: &Channel) -> StoreResult<bool> {
            let n = self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(n >= self.conflicts)
        }

        async fn get_channel(&self, channel_id: &str) -> StoreResult<Channel> {
            Err(StoreError::NoSuchChannel(channel_id.to_string()))
        }

        async fn add_subscription(&self, _: &str, _: &Subscription) -> StoreResult<()> {
            Ok(())
        }

        async fn remove_subscription(&self, _: &str, _: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn put_message(
            &self,
            _: &str,
            _: &str,
            _: &MessageData,
            _: &DeliveryResult,
        ) -> StoreResult<MessageId> {
            Ok(1)
        }

        async fn get_messages(&self, _: &str) -> StoreResult<Vec<Message>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_register_retries_on_collision() {
        let store = CollidingStore {
            conflicts: 3,
            inserts: AtomicU32::new(0),
        };

        let id = store.register_channel(RegistrantMeta::default()).await.unwrap();
        assert!(crate::channel_id::validate_id(&id));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_register_gives_up_after_bounded_attempts() {
        let store = CollidingStore {
            conflicts: u32::MAX,
            inserts: AtomicU32::new(0),
        };

        let err = store.register_channel(RegistrantMeta::default()).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::AllocationError { attempts } if attempts == MAX_ALLOCATION_ATTEMPTS
        ));
        assert_eq!(store.inserts.load(Ordering::SeqCst), MAX_ALLOCATION_ATTEMPTS);
    }
}
