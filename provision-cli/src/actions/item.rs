//! Reviewable action items built from an analysis result

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::types::{ActionKind, normalize};

/// One detected directory mutation, as reviewed and selected by the user.
///
/// Items are created in bulk from an analysis payload and discarded wholesale
/// when a re-analysis completes; they are never merged or individually
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    /// Canonical (normalized) action type.
    pub action_type: String,
    pub object_name: String,
    pub path: String,
    pub message: String,
    /// Attribute values the backend intends to write, kept as raw JSON.
    pub attributes: Value,
    pub selected: bool,
}

impl ActionItem {
    pub fn new(
        action_type: &str,
        object_name: String,
        path: String,
        message: String,
        attributes: Value,
        selected: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_type: normalize(action_type),
            object_name,
            path,
            message,
            attributes,
            selected,
        }
    }

    pub fn kind(&self) -> ActionKind {
        ActionKind::from_action_type(&self.action_type)
    }

    /// Compare against an already-normalized type.
    pub fn is_type(&self, normalized_type: &str) -> bool {
        self.action_type == normalized_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_normalizes_action_type() {
        let item = ActionItem::new(
            "01",
            "jdupont".to_string(),
            "OU=Students,DC=school,DC=org".to_string(),
            String::new(),
            json!({}),
            true,
        );
        assert_eq!(item.action_type, "1");
        assert_eq!(item.kind(), ActionKind::CreateUser);
    }

    #[test]
    fn test_is_type_compares_normalized() {
        let item = ActionItem::new(
            "CREATE_TEAM",
            "3A-Maths".to_string(),
            String::new(),
            String::new(),
            json!({}),
            true,
        );
        assert!(item.is_type("CREATE_TEAM"));
        assert!(!item.is_type("1"));
    }
}
