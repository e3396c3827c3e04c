use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::error::{PushError, PushResult};
use crate::handlers::push::SUBSCRIBER_HEADER;
use crate::models::{common::ActionResult, subscription::PlatformSubscription};
use crate::services::registry::PushRegistry;

/// The three remote operations of the subscription registry.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    async fn subscribe(&self, subscription: PlatformSubscription) -> PushResult<ActionResult>;
    async fn unsubscribe(&self) -> PushResult<ActionResult>;
    async fn send_notification(&self, message: &str) -> PushResult<ActionResult>;
}

/// Talks to the registry over its HTTP interface.
#[derive(Clone)]
pub struct HttpRegistryClient {
    client: Client,
    base_url: String,
    subscriber: String,
}

impl HttpRegistryClient {
    pub fn new(base_url: impl Into<String>, subscriber: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            subscriber: subscriber.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/push/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> PushResult<ActionResult> {
        let response = self
            .client
            .post(self.url(path))
            .header(SUBSCRIBER_HEADER, &self.subscriber)
            .json(&body)
            .send()
            .await
            .map_err(|e| PushError::Api(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PushError::NoSubscription);
        }
        if !status.is_success() {
            let message = response
                .json::<ActionResult>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("registry responded with HTTP {}", status.as_u16()));
            return Err(PushError::Api(message));
        }

        response
            .json::<ActionResult>()
            .await
            .map_err(|e| PushError::Api(e.to_string()))
    }
}

#[async_trait]
impl RegistryApi for HttpRegistryClient {
    async fn subscribe(&self, subscription: PlatformSubscription) -> PushResult<ActionResult> {
        let body = serde_json::to_value(subscription).map_err(|e| PushError::Api(e.to_string()))?;
        self.post("subscribe", body).await
    }

    async fn unsubscribe(&self) -> PushResult<ActionResult> {
        self.post("unsubscribe", json!({})).await
    }

    async fn send_notification(&self, message: &str) -> PushResult<ActionResult> {
        self.post("send", json!({ "message": message })).await
    }
}

/// In-process access to a registry on behalf of one subscriber.
#[derive(Clone)]
pub struct LocalRegistryClient {
    registry: PushRegistry,
    subscriber: String,
}

impl LocalRegistryClient {
    pub fn new(registry: PushRegistry, subscriber: impl Into<String>) -> Self {
        Self {
            registry,
            subscriber: subscriber.into(),
        }
    }
}

#[async_trait]
impl RegistryApi for LocalRegistryClient {
    async fn subscribe(&self, subscription: PlatformSubscription) -> PushResult<ActionResult> {
        self.registry.subscribe(&self.subscriber, subscription)
    }

    async fn unsubscribe(&self) -> PushResult<ActionResult> {
        self.registry.unsubscribe(&self.subscriber)
    }

    async fn send_notification(&self, message: &str) -> PushResult<ActionResult> {
        self.registry.send_notification(&self.subscriber, message).await
    }
}
