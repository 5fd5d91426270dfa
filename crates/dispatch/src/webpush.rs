//! Web push delivery (RFC 8030) with VAPID authentication (RFC 8292).
//!
//! The `web-push` crate signs the VAPID JWT and encrypts the payload
//! (RFC 8291, `aes128gcm`); the HTTP request itself goes out through a
//! shared `reqwest::Client` so connections are pooled across a fan-out.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use notify_core::config::Settings;
use notify_core::types::Subscription;
use tracing::debug;
use web_push::{
    ContentEncoding, PartialVapidSignatureBuilder, SubscriptionInfo, VapidSignatureBuilder,
    WebPushMessage, WebPushMessageBuilder,
};

use crate::transport::{check_status, PushError, PushTransport};

/// Raw P-256 private scalar length.
const VAPID_PRIVATE_KEY_LEN: usize = 32;

pub struct WebPushTransport {
    client: reqwest::Client,
    signer: PartialVapidSignatureBuilder,
    vapid_subject: String,
    ttl_secs: u32,
}

impl WebPushTransport {
    /// Fails unless `vapid_private_key` is a base64url P-256 private key.
    pub fn new(
        client: reqwest::Client,
        vapid_private_key: &str,
        vapid_subject: impl Into<String>,
        ttl_secs: u32,
    ) -> Result<Self, PushError> {
        Ok(Self {
            client,
            signer: vapid_signer(vapid_private_key)?,
            vapid_subject: vapid_subject.into(),
            ttl_secs,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(settings.push_timeout)
            .build()?;
        Self::new(
            client,
            &settings.vapid_private_key,
            settings.vapid_subject.clone(),
            settings.push_ttl_secs,
        )
    }

    fn build_message(
        &self,
        subscription: &Subscription,
        payload: &[u8],
    ) -> Result<WebPushMessage, PushError> {
        let sub_info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut sig_builder = self.signer.clone().add_sub_info(&sub_info);
        sig_builder.add_claim("sub", self.vapid_subject.as_str());
        let signature = sig_builder
            .build()
            .map_err(|err| PushError::Build(format!("VAPID signature: {err}")))?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl_secs);

        builder
            .build()
            .map_err(|err| PushError::Build(err.to_string()))
    }
}

/// The key length is checked here; `web-push` panics on a wrong-sized key.
fn vapid_signer(private_key: &str) -> Result<PartialVapidSignatureBuilder, PushError> {
    let encoded = private_key.trim().trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|err| PushError::Build(format!("VAPID key is not base64url: {err}")))?;
    if decoded.len() != VAPID_PRIVATE_KEY_LEN {
        return Err(PushError::Build(format!(
            "VAPID key is {} bytes, expected {VAPID_PRIVATE_KEY_LEN}",
            decoded.len()
        )));
    }

    VapidSignatureBuilder::from_base64_no_sub(encoded)
        .map_err(|err| PushError::Build(format!("VAPID key: {err}")))
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(&self, subscription: &Subscription, payload: &[u8]) -> Result<(), PushError> {
        let message = self.build_message(subscription, payload)?;

        let mut request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(urgency) = message.urgency {
            request = request.header("Urgency", urgency.to_string());
        }

        if let Some(topic) = message.topic {
            request = request.header("Topic", topic);
        }

        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");

            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }

            request = request.body(push_payload.content);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(endpoint = %subscription.endpoint, status = status.as_u16(), "push service responded");

        let body = if status.is_success() {
            String::new()
        } else {
            response.text().await.unwrap_or_default()
        };
        check_status(status.as_u16(), body)
    }
}
