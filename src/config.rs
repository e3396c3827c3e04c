use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub store_url: String,
    pub vapid: VapidConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapidConfig {
    /// Application server key handed to browsers (base64url, uncompressed P-256 point)
    pub public_key: String,
    /// Signing key, base64url encoded. Never sent to clients.
    #[serde(skip_serializing)]
    pub private_key: String,
    /// `mailto:` or `https:` contact used as the JWT `sub` claim
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub title: String,
    pub icon: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => 8080,
        };

        let public_key = lookup("VAPID_PUBLIC_KEY")
            .or_else(|| lookup("NEXT_PUBLIC_VAPID_PUBLIC_KEY"))
            .ok_or(ConfigError::Missing("VAPID_PUBLIC_KEY"))?;
        let private_key =
            lookup("VAPID_PRIVATE_KEY").ok_or(ConfigError::Missing("VAPID_PRIVATE_KEY"))?;

        let subject = lookup("VAPID_SUBJECT")
            .unwrap_or_else(|| "mailto:admin@stellerseller.app".to_string());
        if !(subject.starts_with("mailto:") || subject.starts_with("https:")) {
            return Err(ConfigError::Invalid {
                name: "VAPID_SUBJECT",
                value: subject,
            });
        }

        Ok(Config {
            port,
            store_url: lookup("SUBSCRIPTION_STORE_URL")
                .unwrap_or_else(|| "memory://".to_string()),
            vapid: VapidConfig {
                public_key,
                private_key,
                subject,
            },
            notification: NotificationConfig {
                title: lookup("NOTIFICATION_TITLE")
                    .unwrap_or_else(|| "Test Notification".to_string()),
                icon: lookup("NOTIFICATION_ICON").unwrap_or_else(|| "/icon.png".to_string()),
            },
        })
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Test Notification".to_string(),
            icon: "/icon.png".to_string(),
        }
    }
}
