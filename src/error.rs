use thiserror::Error;

use crate::services::store::StoreError;

pub const NO_SUBSCRIPTION_MESSAGE: &str = "No subscription available";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send notification";

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Push notification permission denied")]
    PermissionDenied,
    #[error("{}", NO_SUBSCRIPTION_MESSAGE)]
    NoSubscription,
    #[error("service worker registration failed: {0}")]
    Registration(String),
    #[error("push platform error: {0}")]
    Platform(String),
    #[error("subscription store error: {0}")]
    Store(#[from] StoreError),
    #[error("registry request failed: {0}")]
    Api(String),
}

pub type PushResult<T> = Result<T, PushError>;
