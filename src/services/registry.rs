use std::sync::Arc;

use crate::config::NotificationConfig;
use crate::error::{PushError, PushResult, SEND_FAILED_MESSAGE};
use crate::models::{
    common::ActionResult,
    notification::NotificationPayload,
    subscription::{PlatformSubscription, RegistryState, StoredSubscription},
};
use crate::services::gateway::PushGateway;
use crate::services::store::SubscriptionStore;

/// Holds one push subscription per subscriber and gates delivery to it.
#[derive(Clone)]
pub struct PushRegistry {
    store: Arc<dyn SubscriptionStore>,
    gateway: Arc<dyn PushGateway>,
    notification: NotificationConfig,
}

impl PushRegistry {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        gateway: Arc<dyn PushGateway>,
        notification: NotificationConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            notification,
        }
    }

    /// Stores `subscription` for `subscriber`, replacing any previous one.
    pub fn subscribe(
        &self,
        subscriber: &str,
        subscription: PlatformSubscription,
    ) -> PushResult<ActionResult> {
        let record = subscription.into_record();
        let endpoint = record.endpoint.clone();
        self.store.put(StoredSubscription::new(subscriber, record))?;
        log::info!("Subscriber {} subscribed via {}", subscriber, endpoint);
        Ok(ActionResult::ok())
    }

    /// Clears the subscription of `subscriber`. Succeeds even if none exists.
    pub fn unsubscribe(&self, subscriber: &str) -> PushResult<ActionResult> {
        if self.store.remove(subscriber)? {
            log::info!("Subscriber {} unsubscribed", subscriber);
        } else {
            log::debug!("Unsubscribe for {} with no stored subscription", subscriber);
        }
        Ok(ActionResult::ok())
    }

    /// Sends `message` as the body of a notification.
    ///
    /// Fails with [`PushError::NoSubscription`] when nothing is stored. Gateway
    /// failures do not propagate; they come back as an unsuccessful result.
    pub async fn send_notification(
        &self,
        subscriber: &str,
        message: &str,
    ) -> PushResult<ActionResult> {
        let stored = self
            .store
            .get(subscriber)?
            .ok_or(PushError::NoSubscription)?;

        let payload = NotificationPayload::new(&self.notification, message);
        let json = match serde_json::to_string(&payload) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Error encoding push payload: {}", e);
                return Ok(ActionResult::failed(SEND_FAILED_MESSAGE));
            }
        };

        match self.gateway.deliver(&stored.record, &json).await {
            Ok(()) => Ok(ActionResult::ok()),
            Err(e) => {
                log::error!("Error sending push notification to {}: {}", subscriber, e);
                Ok(ActionResult::failed(SEND_FAILED_MESSAGE))
            }
        }
    }

    pub fn state(&self, subscriber: &str) -> PushResult<RegistryState> {
        Ok(match self.store.get(subscriber)? {
            Some(_) => RegistryState::Subscribed,
            None => RegistryState::Empty,
        })
    }

    pub fn subscriber_count(&self) -> PushResult<usize> {
        Ok(self.store.count()?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::models::subscription::PushSubscriptionRecord;
    use crate::services::gateway::{GatewayError, PushGateway};

    /// Gateway double that records every delivery.
    #[derive(Default)]
    pub struct RecordingGateway {
        pub deliveries: Mutex<Vec<(String, String)>>,
        pub fail: bool,
    }

    impl RecordingGateway {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn delivered(&self) -> Vec<(String, String)> {
            self.deliveries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushGateway for RecordingGateway {
        async fn deliver(
            &self,
            record: &PushSubscriptionRecord,
            payload: &str,
        ) -> Result<(), GatewayError> {
            self.deliveries
                .lock()
                .unwrap()
                .push((record.endpoint.clone(), payload.to_string()));
            if self.fail {
                Err(GatewayError::Rejected {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }
}
