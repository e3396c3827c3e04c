//! Client-side subscription controller.
//!
//! Mediates between the user, the platform permission prompt and the
//! subscription registry. Every call runs to completion; dropping the returned
//! future abandons it (e.g. when the page navigates away).

use std::sync::Arc;

use crate::error::{PushError, PushResult};
use crate::models::{common::ActionResult, subscription::PlatformSubscription};

use super::api::RegistryApi;
use super::platform::{PermissionState, PlatformError, PushPlatform, WorkerRegistration};

pub const PERMISSION_DENIED_ALERT: &str =
    "You have denied notifications. Please enable them in your browser settings.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub supported: bool,
    pub subscribed: bool,
}

pub struct SubscriptionController {
    platform: Arc<dyn PushPlatform>,
    registry: Arc<dyn RegistryApi>,
    application_server_key: String,
    registration: WorkerRegistration,
    supported: bool,
    subscription: Option<PlatformSubscription>,
}

impl SubscriptionController {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        registry: Arc<dyn RegistryApi>,
        application_server_key: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            registry,
            application_server_key: application_server_key.into(),
            registration: WorkerRegistration::default(),
            supported: false,
            subscription: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            supported: self.supported,
            subscribed: self.subscription.is_some(),
        }
    }

    /// Registers the background worker and picks up an existing subscription.
    ///
    /// Registration failures are logged and leave the controller unsubscribed.
    pub async fn register_worker(&mut self) -> ControllerState {
        self.supported = self.platform.is_supported();
        if !self.supported {
            log::info!("Push notifications are not supported on this platform");
            return self.state();
        }

        match self.try_register().await {
            Ok(existing) => self.subscription = existing,
            Err(e) => {
                log::error!("{}", e);
                self.subscription = None;
            }
        }
        self.state()
    }

    async fn try_register(&self) -> PushResult<Option<PlatformSubscription>> {
        self.platform
            .register_worker(&self.registration)
            .await
            .map_err(|e| PushError::Registration(e.to_string()))?;
        self.platform
            .current_subscription()
            .await
            .map_err(|e| PushError::Registration(e.to_string()))
    }

    /// Asks for permission, subscribes on the platform and forwards the
    /// subscription to the registry. Local state only changes once the
    /// registry accepted it.
    pub async fn subscribe(&mut self) -> PushResult<ActionResult> {
        let result = self.try_subscribe().await;
        match &result {
            Err(PushError::PermissionDenied) => {
                log::error!("User denied permission for push notifications");
                self.platform.alert(PERMISSION_DENIED_ALERT);
            }
            Err(e) => log::error!("Push subscription failed: {}", e),
            Ok(_) => {}
        }
        result
    }

    async fn try_subscribe(&mut self) -> PushResult<ActionResult> {
        let permission = self
            .platform
            .request_permission()
            .await
            .map_err(platform_error)?;
        if permission != PermissionState::Granted {
            return Err(PushError::PermissionDenied);
        }

        let subscription = self
            .platform
            .subscribe(true, &self.application_server_key)
            .await
            .map_err(platform_error)?;

        let result = self.registry.subscribe(subscription.clone()).await?;
        self.subscription = Some(subscription);
        Ok(result)
    }

    /// Cancels the platform subscription, clears local state and tells the registry.
    pub async fn unsubscribe(&mut self) -> PushResult<ActionResult> {
        if self.subscription.is_some() {
            self.platform.unsubscribe().await.map_err(platform_error)?;
        }
        self.subscription = None;
        self.registry.unsubscribe().await
    }

    /// Forwards `message` unchanged for delivery.
    pub async fn send_test(&self, message: &str) -> PushResult<ActionResult> {
        if self.subscription.is_none() {
            return Err(PushError::NoSubscription);
        }
        self.registry.send_notification(message).await
    }
}

fn platform_error(err: PlatformError) -> PushError {
    match err {
        PlatformError::NotAllowed(_) => PushError::PermissionDenied,
        PlatformError::Failed(msg) => PushError::Platform(msg),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::client::api::LocalRegistryClient;
    use crate::config::NotificationConfig;
    use crate::models::subscription::RegistryState;
    use crate::services::registry::{testing::RecordingGateway, PushRegistry};
    use crate::services::store::MemoryStore;

    struct FakePlatform {
        supported: bool,
        fail_registration: bool,
        permission: PermissionState,
        existing: Option<PlatformSubscription>,
        alerts: Mutex<Vec<String>>,
        registrations: Mutex<Vec<WorkerRegistration>>,
        unsubscribed: Mutex<bool>,
    }

    impl FakePlatform {
        fn granting() -> Self {
            Self {
                supported: true,
                fail_registration: false,
                permission: PermissionState::Granted,
                existing: None,
                alerts: Mutex::new(Vec::new()),
                registrations: Mutex::new(Vec::new()),
                unsubscribed: Mutex::new(false),
            }
        }
    }

    fn issued() -> PlatformSubscription {
        serde_json::from_value(serde_json::json!({
            "endpoint": "https://push.example/abc",
            "expirationTime": null,
            "keys": { "p256dh": [1, 2, 3], "auth": [4, 5, 6] }
        }))
        .unwrap()
    }

    #[async_trait]
    impl PushPlatform for FakePlatform {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn register_worker(
            &self,
            registration: &WorkerRegistration,
        ) -> Result<(), PlatformError> {
            self.registrations.lock().unwrap().push(registration.clone());
            if self.fail_registration {
                Err(PlatformError::Failed("script not found".to_string()))
            } else {
                Ok(())
            }
        }

        async fn current_subscription(
            &self,
        ) -> Result<Option<PlatformSubscription>, PlatformError> {
            Ok(self.existing.clone())
        }

        async fn request_permission(&self) -> Result<PermissionState, PlatformError> {
            Ok(self.permission)
        }

        async fn subscribe(
            &self,
            user_visible_only: bool,
            application_server_key: &str,
        ) -> Result<PlatformSubscription, PlatformError> {
            assert!(user_visible_only);
            assert_eq!(application_server_key, "BPublicKey");
            Ok(issued())
        }

        async fn unsubscribe(&self) -> Result<bool, PlatformError> {
            *self.unsubscribed.lock().unwrap() = true;
            Ok(true)
        }

        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }
    }

    type Fixture = (
        SubscriptionController,
        Arc<FakePlatform>,
        PushRegistry,
        Arc<RecordingGateway>,
    );

    fn setup(platform: FakePlatform) -> Fixture {
        let gateway = Arc::new(RecordingGateway::default());
        let registry = PushRegistry::new(
            Arc::new(MemoryStore::new()),
            gateway.clone(),
            NotificationConfig::default(),
        );
        let platform = Arc::new(platform);
        let controller = SubscriptionController::new(
            platform.clone(),
            Arc::new(LocalRegistryClient::new(registry.clone(), "default")),
            "BPublicKey",
        );
        (controller, platform, registry, gateway)
    }

    #[tokio::test]
    async fn test_register_worker_uses_fixed_scope_and_existing_subscription() {
        let mut platform = FakePlatform::granting();
        platform.existing = Some(issued());
        let (mut controller, platform, _, _) = setup(platform);

        let state = controller.register_worker().await;
        assert_eq!(state, ControllerState { supported: true, subscribed: true });

        let registrations = platform.registrations.lock().unwrap();
        assert_eq!(registrations[0], WorkerRegistration::default());
        assert_eq!(registrations[0].scope, "/");
    }

    #[tokio::test]
    async fn test_registration_failure_falls_back_to_unsubscribed() {
        let mut platform = FakePlatform::granting();
        platform.fail_registration = true;
        platform.existing = Some(issued());
        let (mut controller, _, _, _) = setup(platform);

        let state = controller.register_worker().await;
        assert_eq!(state, ControllerState { supported: true, subscribed: false });
    }

    #[tokio::test]
    async fn test_unsupported_platform_skips_registration() {
        let mut platform = FakePlatform::granting();
        platform.supported = false;
        let (mut controller, platform, _, _) = setup(platform);

        let state = controller.register_worker().await;
        assert!(!state.supported);
        assert!(platform.registrations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_denied_permission_alerts_and_never_reaches_registry() {
        let mut platform = FakePlatform::granting();
        platform.permission = PermissionState::Denied;
        let (mut controller, platform, registry, _) = setup(platform);

        let err = controller.subscribe().await.unwrap_err();
        assert!(matches!(err, PushError::PermissionDenied));
        assert_eq!(
            *platform.alerts.lock().unwrap(),
            vec![PERMISSION_DENIED_ALERT.to_string()]
        );
        assert_eq!(registry.state("default").unwrap(), RegistryState::Empty);
        assert!(!controller.state().subscribed);
    }

    #[tokio::test]
    async fn test_full_flow_through_registry() {
        let (mut controller, platform, registry, gateway) = setup(FakePlatform::granting());
        controller.register_worker().await;

        assert_eq!(controller.subscribe().await.unwrap(), ActionResult::ok());
        assert!(controller.state().subscribed);
        assert_eq!(registry.state("default").unwrap(), RegistryState::Subscribed);

        assert_eq!(controller.send_test("hello").await.unwrap(), ActionResult::ok());
        let delivered = gateway.delivered();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].1.contains(r#""body":"hello""#));

        assert_eq!(controller.unsubscribe().await.unwrap(), ActionResult::ok());
        assert!(*platform.unsubscribed.lock().unwrap());
        assert!(!controller.state().subscribed);
        assert_eq!(registry.state("default").unwrap(), RegistryState::Empty);
    }

    struct RejectingRegistry;

    #[async_trait]
    impl RegistryApi for RejectingRegistry {
        async fn subscribe(&self, _: PlatformSubscription) -> PushResult<ActionResult> {
            Err(PushError::Api("subscription store lock poisoned".to_string()))
        }

        async fn unsubscribe(&self) -> PushResult<ActionResult> {
            Ok(ActionResult::ok())
        }

        async fn send_notification(&self, _: &str) -> PushResult<ActionResult> {
            Err(PushError::NoSubscription)
        }
    }

    #[tokio::test]
    async fn test_registry_failure_keeps_controller_unsubscribed() {
        let mut controller = SubscriptionController::new(
            Arc::new(FakePlatform::granting()),
            Arc::new(RejectingRegistry),
            "BPublicKey",
        );
        controller.register_worker().await;

        let err = controller.subscribe().await.unwrap_err();
        assert!(matches!(err, PushError::Api(_)));
        assert!(!controller.state().subscribed);
    }

    #[tokio::test]
    async fn test_send_test_requires_local_subscription() {
        let (controller, _, _, gateway) = setup(FakePlatform::granting());
        let err = controller.send_test("hello").await.unwrap_err();
        assert!(matches!(err, PushError::NoSubscription));
        assert!(gateway.delivered().is_empty());
    }
}
