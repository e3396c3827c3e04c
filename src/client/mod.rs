//! Subscription controller that runs on the client side of the push flow.

pub mod api;
pub mod controller;
pub mod platform;

pub use api::{HttpRegistryClient, LocalRegistryClient, RegistryApi};
pub use controller::{ControllerState, SubscriptionController};
pub use platform::{
    PermissionState, PlatformError, PushPlatform, UpdateViaCache, WorkerRegistration,
};
