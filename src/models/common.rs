use serde::{Deserialize, Serialize};

/// Result envelope returned by every push operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Identity a subscription is stored under.
pub type SubscriberId = String;

pub const DEFAULT_SUBSCRIBER: &str = "default";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_error() {
        let json = serde_json::to_string(&ActionResult::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn test_failure_carries_error() {
        let failed = ActionResult::failed("Failed to send notification");
        let json = serde_json::to_value(failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to send notification");
    }
}
