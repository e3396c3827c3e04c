pub mod common;
pub mod manifest;
pub mod notification;
pub mod subscription;
