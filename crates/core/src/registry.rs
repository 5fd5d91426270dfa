use std::sync::Arc;
use tracing::{debug, info};

use crate::channel_id;
use crate::error::{StoreError, StoreResult};
use crate::store::NotifyStore;
use crate::types::{Channel, ChannelId, RegistrantMeta, Subscription};

/// Owns channel-id rules and every change to subscription membership.
#[derive(Clone)]
pub struct ChannelRegistry {
    store: Arc<dyn NotifyStore>,
}

impl ChannelRegistry {
    pub fn new(store: Arc<dyn NotifyStore>) -> Self {
        Self { store }
    }

    pub fn new_channel_id() -> ChannelId {
        channel_id::new_channel_id()
    }

    pub fn validate_id(candidate: &str) -> bool {
        channel_id::validate_id(candidate)
    }

    /// Reject malformed ids before they reach storage.
    pub fn check_id(candidate: &str) -> StoreResult<()> {
        if Self::validate_id(candidate) {
            Ok(())
        } else {
            Err(StoreError::InvalidChannelId(candidate.to_string()))
        }
    }

    pub async fn register(&self, meta: RegistrantMeta) -> StoreResult<ChannelId> {
        let channel_id = self.store.register_channel(meta).await?;
        info!(%channel_id, "registered channel");
        Ok(channel_id)
    }

    pub async fn resolve(&self, channel_id: &str) -> StoreResult<Channel> {
        Self::check_id(channel_id)?;
        self.store.get_channel(channel_id).await
    }

    pub async fn subscribe(&self, channel_id: &str, subscription: Subscription) -> StoreResult<()> {
        Self::check_id(channel_id)?;
        self.store.add_subscription(channel_id, &subscription).await?;
        info!(%channel_id, endpoint = %subscription.endpoint, "subscribed endpoint");
        Ok(())
    }

    pub async fn prune(&self, channel_id: &str, subscription_id: &str) -> StoreResult<()> {
        self.store
            .remove_subscription(channel_id, subscription_id)
            .await?;
        debug!(%channel_id, %subscription_id, "pruned subscription");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::types::SubscriptionKeys;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sub(endpoint: &str, auth: &str) -> Subscription {
        Subscription::new(
            endpoint,
            SubscriptionKeys {
                p256dh: "p256dh".to_string(),
                auth: auth.to_string(),
            },
        )
    }

    /// Counts lookups so tests can assert storage was never touched.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl NotifyStore for CountingStore {
        async fn insert_channel(&self, channel: &Channel) -> StoreResult<bool> {
            self.inner.insert_channel(channel).await
        }

        async fn get_channel(&self, channel_id: &str) -> StoreResult<Channel> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_channel(channel_id).await
        }

        async fn add_subscription(&self, id: &str, s: &Subscription) -> StoreResult<()> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.add_subscription(id, s).await
        }

        async fn remove_subscription(&self, id: &str, sub_id: &str) -> StoreResult<()> {
            self.inner.remove_subscription(id, sub_id).await
        }

        async fn put_message(
            &self,
            id: &str,
            content: &str,
            data: &crate::types::MessageData,
            result: &crate::types::DeliveryResult,
        ) -> StoreResult<crate::types::MessageId> {
            self.inner.put_message(id, content, data, result).await
        }

        async fn get_messages(&self, id: &str) -> StoreResult<Vec<crate::types::Message>> {
            self.inner.get_messages(id).await
        }
    }

    #[tokio::test]
    async fn test_register_then_resolve() {
        let registry = ChannelRegistry::new(Arc::new(MemoryStore::new()));
        let id = registry.register(RegistrantMeta::default()).await.unwrap();

        assert!(ChannelRegistry::validate_id(&id));
        let channel = registry.resolve(&id).await.unwrap();
        assert_eq!(channel.id, id);
    }

    #[tokio::test]
    async fn test_malformed_id_never_reaches_storage() {
        let store = Arc::new(CountingStore::default());
        let registry = ChannelRegistry::new(store.clone());

        let err = registry.resolve("undefined").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidChannelId(id) if id == "undefined"));

        let err = registry
            .subscribe("a;DROP--", sub("https://push/e1", "a"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidChannelId(_)));

        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_but_well_formed_id() {
        let registry = ChannelRegistry::new(Arc::new(MemoryStore::new()));
        let err = registry.resolve("ab12cd34").await.unwrap_err();
        assert!(matches!(err, StoreError::NoSuchChannel(id) if id == "ab12cd34"));
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_keys() {
        let registry = ChannelRegistry::new(Arc::new(MemoryStore::new()));
        let id = registry.register(RegistrantMeta::default()).await.unwrap();

        registry.subscribe(&id, sub("https://push/e1", "old")).await.unwrap();
        registry.subscribe(&id, sub("https://push/e1", "new")).await.unwrap();

        let channel = registry.resolve(&id).await.unwrap();
        assert_eq!(channel.subscription_ids(), vec!["https://push/e1"]);
        assert_eq!(channel.subscriptions["https://push/e1"].keys.auth, "new");
    }

    #[tokio::test]
    async fn test_prune_removes_only_named_subscription() {
        let registry = ChannelRegistry::new(Arc::new(MemoryStore::new()));
        let id = registry.register(RegistrantMeta::default()).await.unwrap();
        registry.subscribe(&id, sub("https://push/e1", "a")).await.unwrap();
        registry.subscribe(&id, sub("https://push/e2", "b")).await.unwrap();

        registry.prune(&id, "https://push/e1").await.unwrap();
        registry.prune(&id, "https://push/e1").await.unwrap();

        let channel = registry.resolve(&id).await.unwrap();
        assert_eq!(channel.subscription_ids(), vec!["https://push/e2"]);
    }
}
