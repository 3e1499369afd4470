use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Item Identity
// ============================================================================

/// Store-assigned item identifier.
///
/// The store hands out JSON numbers; string ids are accepted as well and
/// treated opaquely. The client never mints one of these itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

// ============================================================================
// Wire Records
// ============================================================================

/// One task entry as the store represents it.
///
/// `completed` is absent entirely in stores that do not track completion;
/// a missing field reads as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Body of a partial update. Only the fields that are set go on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ItemPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_item_numeric_id() {
        let item: Item =
            serde_json::from_str(r#"{"id": 7, "title": "buy milk", "completed": true}"#).unwrap();
        assert_eq!(item.id, ItemId::Number(7));
        assert_eq!(item.title, "buy milk");
        assert!(item.completed);
    }

    #[test]
    fn test_item_string_id() {
        let item: Item = serde_json::from_str(r#"{"id": "a1f3", "title": "x"}"#).unwrap();
        assert_eq!(item.id, ItemId::Text("a1f3".to_string()));
    }

    #[test]
    fn test_missing_completed_defaults_false() {
        let item: Item = serde_json::from_str(r#"{"id": 1, "title": "plain"}"#).unwrap();
        assert!(!item.completed);
    }

    #[test]
    fn test_item_missing_title_rejected() {
        let result = serde_json::from_str::<Item>(r#"{"id": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_item_omits_absent_completed() {
        let body = NewItem {
            title: "only a title".to_string(),
            completed: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"title": "only a title"})
        );
    }

    #[test]
    fn test_new_item_with_completed() {
        let body = NewItem {
            title: "t".to_string(),
            completed: Some(false),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"title": "t", "completed": false})
        );
    }

    #[test]
    fn test_patch_serializes_single_field() {
        assert_eq!(
            serde_json::to_value(ItemPatch::completed(true)).unwrap(),
            serde_json::json!({"completed": true})
        );
        assert_eq!(
            serde_json::to_value(ItemPatch::title("renamed")).unwrap(),
            serde_json::json!({"title": "renamed"})
        );
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ItemId::from(42).to_string(), "42");
        assert_eq!(ItemId::from("abc").to_string(), "abc");
    }
}
