use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::SubscriberId;

/// Encryption keys of a push subscription, standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// The shape the delivery gateway needs: endpoint plus encoded keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionRecord {
    pub endpoint: String,
    pub expiration_time: Option<f64>,
    pub keys: SubscriptionKeys,
}

/// Key bytes as a platform may hand them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyMaterial {
    Encoded(String),
    Raw(Vec<u8>),
}

impl KeyMaterial {
    fn into_base64(self) -> String {
        match self {
            KeyMaterial::Encoded(encoded) => encoded,
            KeyMaterial::Raw(bytes) => STANDARD.encode(bytes),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformKeys {
    #[serde(default)]
    pub p256dh: Option<KeyMaterial>,
    #[serde(default)]
    pub auth: Option<KeyMaterial>,
}

/// A subscription as issued by the browser push manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<f64>,
    #[serde(default)]
    pub keys: PlatformKeys,
}

impl PlatformSubscription {
    /// Converts into the gateway shape. Missing keys become empty strings and a
    /// zero expiration time is treated as "no expiration".
    pub fn into_record(self) -> PushSubscriptionRecord {
        PushSubscriptionRecord {
            endpoint: self.endpoint,
            expiration_time: self.expiration_time.filter(|t| *t != 0.0),
            keys: SubscriptionKeys {
                p256dh: self
                    .keys
                    .p256dh
                    .map(KeyMaterial::into_base64)
                    .unwrap_or_default(),
                auth: self
                    .keys
                    .auth
                    .map(KeyMaterial::into_base64)
                    .unwrap_or_default(),
            },
        }
    }
}

/// A record as kept by a subscription store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubscription {
    pub id: Uuid,
    pub subscriber: SubscriberId,
    pub record: PushSubscriptionRecord,
    pub created_at: DateTime<Utc>,
}

impl StoredSubscription {
    pub fn new(subscriber: impl Into<SubscriberId>, record: PushSubscriptionRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscriber: subscriber.into(),
            record,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryState {
    Empty,
    Subscribed,
}
