//! Behaviour every `NotifyStore` backend must share.

use notify_core::channel_id::new_channel_id;
use notify_core::error::StoreError;
use notify_core::store::NotifyStore;
use notify_core::types::{
    Channel, DeliveryOutcome, DeliveryResult, MessageData, RegistrantMeta, Subscription,
    SubscriptionKeys,
};

fn subscription(endpoint: &str, auth: &str) -> Subscription {
    Subscription::new(
        endpoint,
        SubscriptionKeys {
            p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM".to_string(),
            auth: auth.to_string(),
        },
    )
}

pub(crate) async fn run_all(store: &dyn NotifyStore) {
    insert_channel_is_insert_if_absent(store).await;
    add_subscription_upserts_by_endpoint(store).await;
    remove_subscription_is_idempotent(store).await;
    messages_keep_append_order(store).await;
    missing_channel_is_not_found(store).await;
}

async fn insert_channel_is_insert_if_absent(store: &dyn NotifyStore) {
    let first = Channel::new(
        new_channel_id(),
        RegistrantMeta {
            ip: Some("10.0.0.1".to_string()),
            agent: None,
        },
    );
    assert!(store.insert_channel(&first).await.unwrap());

    let mut second = Channel::new(first.id.clone(), RegistrantMeta::default());
    second.created_meta.agent = Some("curl/8".to_string());
    assert!(!store.insert_channel(&second).await.unwrap());

    let stored = store.get_channel(&first.id).await.unwrap();
    assert_eq!(stored.created_meta, first.created_meta);
}

async fn add_subscription_upserts_by_endpoint(store: &dyn NotifyStore) {
    let channel = Channel::new(new_channel_id(), RegistrantMeta::default());
    store.insert_channel(&channel).await.unwrap();

    let endpoint = "https://push.example/send/e1";
    store
        .add_subscription(&channel.id, &subscription(endpoint, "old-auth"))
        .await
        .unwrap();
    store
        .add_subscription(&channel.id, &subscription(endpoint, "new-auth"))
        .await
        .unwrap();

    let stored = store.get_channel(&channel.id).await.unwrap();
    assert_eq!(stored.subscriptions.len(), 1);
    assert_eq!(stored.subscriptions[endpoint].keys.auth, "new-auth");
}

async fn remove_subscription_is_idempotent(store: &dyn NotifyStore) {
    let channel = Channel::new(new_channel_id(), RegistrantMeta::default());
    store.insert_channel(&channel).await.unwrap();

    let endpoint = "https://push.example/send/e2";
    store
        .add_subscription(&channel.id, &subscription(endpoint, "auth"))
        .await
        .unwrap();
    store.remove_subscription(&channel.id, endpoint).await.unwrap();
    store.remove_subscription(&channel.id, endpoint).await.unwrap();
    store
        .remove_subscription(&channel.id, "https://push.example/never-added")
        .await
        .unwrap();

    let stored = store.get_channel(&channel.id).await.unwrap();
    assert!(stored.subscriptions.is_empty());
}

async fn messages_keep_append_order(store: &dyn NotifyStore) {
    let channel = Channel::new(new_channel_id(), RegistrantMeta::default());
    store.insert_channel(&channel).await.unwrap();

    let result: DeliveryResult = [(
        "https://push.example/send/e1".to_string(),
        DeliveryOutcome::Delivered,
    )]
    .into();
    let data = MessageData {
        action: Some("https://ci.example/42".to_string()),
    };

    let mut ids = Vec::new();
    for content in ["one", "two", "three"] {
        ids.push(
            store
                .put_message(&channel.id, content, &data, &result)
                .await
                .unwrap(),
        );
    }
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]), "{ids:?}");

    let messages = store.get_messages(&channel.id).await.unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
    assert_eq!(messages.iter().map(|m| m.id).collect::<Vec<_>>(), ids);
    assert_eq!(messages[0].data, data);
    assert_eq!(messages[0].delivery_result, result);
    assert!(messages.iter().all(|m| m.channel_id == channel.id));
}

async fn missing_channel_is_not_found(store: &dyn NotifyStore) {
    let id = new_channel_id();

    assert!(matches!(
        store.get_channel(&id).await,
        Err(StoreError::NoSuchChannel(_))
    ));
    assert!(matches!(
        store.get_messages(&id).await,
        Err(StoreError::NoSuchChannel(_))
    ));
    assert!(matches!(
        store
            .add_subscription(&id, &subscription("https://push.example/e3", "auth"))
            .await,
        Err(StoreError::NoSuchChannel(_))
    ));
    assert!(matches!(
        store
            .put_message(&id, "hi", &MessageData::default(), &DeliveryResult::new())
            .await,
        Err(StoreError::NoSuchChannel(_))
    ));
}

#[tokio::test]
async fn test_memory_store_shares_backend_behaviour() {
    run_all(&notify_core::MemoryStore::new()).await;
}
