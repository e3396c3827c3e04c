//! Push delivery gateway.
//!
//! Encrypts payloads (RFC 8291) and signs requests with VAPID (RFC 8292)
//! through the `web-push` crate, then sends the message with reqwest.

use async_trait::async_trait;
use base64::{
    alphabet,
    engine::general_purpose::{GeneralPurpose, NO_PAD, URL_SAFE_NO_PAD},
    engine::DecodePaddingMode,
    Engine,
};
use reqwest::Client;
use thiserror::Error;
use web_push::{ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessageBuilder};

use crate::config::VapidConfig;
use crate::models::subscription::PushSubscriptionRecord;

/// Time-to-live handed to the push service, in seconds.
const DEFAULT_TTL: u32 = 86_400;

const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid subscription key {name}")]
    InvalidKey { name: &'static str },
    #[error("VAPID signing failed: {0}")]
    Vapid(String),
    #[error("could not build push message: {0}")]
    Message(String),
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("subscription is gone (410)")]
    SubscriptionGone,
    #[error("push service rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Delivers one UTF-8 JSON payload to the endpoint of `record`.
    async fn deliver(&self, record: &PushSubscriptionRecord, payload: &str)
        -> Result<(), GatewayError>;
}

/// Re-encodes a key given in either base64 alphabet, padded or not, as
/// unpadded base64url, which is what `web-push` decodes.
fn to_url_safe(name: &'static str, key: &str) -> Result<String, GatewayError> {
    let bytes = LENIENT_STANDARD
        .decode(key)
        .or_else(|_| LENIENT_URL_SAFE.decode(key))
        .map_err(|_| GatewayError::InvalidKey { name })?;
    if bytes.is_empty() {
        return Err(GatewayError::InvalidKey { name });
    }
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[derive(Clone)]
pub struct WebPushGateway {
    client: Client,
    vapid: VapidConfig,
    ttl: u32,
}

impl WebPushGateway {
    pub fn new(vapid: VapidConfig) -> Self {
        Self {
            client: Client::new(),
            vapid,
            ttl: DEFAULT_TTL,
        }
    }
}

#[async_trait]
impl PushGateway for WebPushGateway {
    async fn deliver(
        &self,
        record: &PushSubscriptionRecord,
        payload: &str,
    ) -> Result<(), GatewayError> {
        let p256dh = to_url_safe("p256dh", &record.keys.p256dh)?;
        let auth = to_url_safe("auth", &record.keys.auth)?;
        let sub_info =
            SubscriptionInfo::new(record.endpoint.as_str(), p256dh.as_str(), auth.as_str());

        let mut sig_builder =
            VapidSignatureBuilder::from_base64(&self.vapid.private_key, &sub_info)
                .map_err(|e| GatewayError::Vapid(e.to_string()))?;
        sig_builder.add_claim("sub", self.vapid.subject.as_str());
        let signature = sig_builder
            .build()
            .map_err(|e| GatewayError::Vapid(e.to_string()))?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload.as_bytes());
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl);

        let message = builder
            .build()
            .map_err(|e| GatewayError::Message(e.to_string()))?;

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
        let status = response.status().as_u16();

        match status {
            200..=299 => {
                log::debug!("Push delivered to {} (HTTP {})", record.endpoint, status);
                Ok(())
            }
            410 => Err(GatewayError::SubscriptionGone),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(GatewayError::Rejected { status, body })
            }
        }
    }
}
