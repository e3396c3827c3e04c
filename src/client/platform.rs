use async_trait::async_trait;
use thiserror::Error;

use crate::models::subscription::PlatformSubscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateViaCache {
    Imports,
    All,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRegistration {
    pub script_url: String,
    pub scope: String,
    pub update_via_cache: UpdateViaCache,
}

impl Default for WorkerRegistration {
    fn default() -> Self {
        Self {
            script_url: "/sw.js".to_string(),
            scope: "/".to_string(),
            update_via_cache: UpdateViaCache::None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("permission not allowed: {0}")]
    NotAllowed(String),
    #[error("{0}")]
    Failed(String),
}

/// Browser capabilities the subscription controller drives.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Whether both a background worker and a push manager are available.
    fn is_supported(&self) -> bool;

    async fn register_worker(&self, registration: &WorkerRegistration)
        -> Result<(), PlatformError>;

    async fn current_subscription(&self) -> Result<Option<PlatformSubscription>, PlatformError>;

    /// May stay pending until the user answers the prompt.
    async fn request_permission(&self) -> Result<PermissionState, PlatformError>;

    async fn subscribe(
        &self,
        user_visible_only: bool,
        application_server_key: &str,
    ) -> Result<PlatformSubscription, PlatformError>;

    async fn unsubscribe(&self) -> Result<bool, PlatformError>;

    /// Blocking user-facing alert.
    fn alert(&self, message: &str);
}
