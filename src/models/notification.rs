use serde::{Deserialize, Serialize};

use crate::config::NotificationConfig;

/// JSON body delivered to the push service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
}

impl NotificationPayload {
    pub fn new(config: &NotificationConfig, message: impl Into<String>) -> Self {
        Self {
            title: config.title.clone(),
            body: message.into(),
            icon: config.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendNotificationRequest {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_message_verbatim() {
        let payload = NotificationPayload::new(&NotificationConfig::default(), "  hello <b>\n");
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Test Notification","body":"  hello <b>\n","icon":"/icon.png"}"#
        );
    }
}
