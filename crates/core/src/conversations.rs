//! Conversation and tag models, and conversation listing filters
//!
//! Conversations are read-only here: fetched, filtered by tag or recency, and
//! searched by free text.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pagination::{Pages, Paginated};

/// Page size requested when listing conversations
pub const CONVERSATIONS_PER_PAGE: u32 = 50;

/// Default lookback window for conversation listings
pub const DEFAULT_DAYS_BACK: u32 = 30;

// ============================================================================
// Domain Models (Input from API)
// ============================================================================

/// Tag attached to conversations
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Tag {
    #[serde(deserialize_with = "crate::de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
}

/// `{"type": "tag.list", "tags": [...]}` wrapper used inside conversations
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TagList {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub tags: Vec<Tag>,
}

/// `GET /tags` response
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TagsResponse {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub data: Vec<Tag>,
}

/// Conversation as returned by the Intercom API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Conversation {
    #[serde(deserialize_with = "crate::de::id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub tags: TagList,
    /// First message of the conversation
    #[serde(default)]
    pub source: Option<Value>,
    /// Replies, notes and state changes; only present on single-conversation fetches
    #[serde(default)]
    pub conversation_parts: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Conversation {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of parts (replies, notes) included in the payload
    pub fn part_count(&self) -> usize {
        self.conversation_parts
            .as_ref()
            .and_then(|parts| parts.get("conversation_parts"))
            .and_then(|parts| parts.as_array())
            .map_or(0, |parts| parts.len())
    }
}

/// `GET /conversations` and `GET /conversations/search` response
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConversationList {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub pages: Option<Pages>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl Paginated for ConversationList {
    type Item = Conversation;

    fn into_parts(self) -> (Vec<Conversation>, Option<Pages>) {
        (self.conversations, self.pages)
    }
}

// ============================================================================
// Listing Filters
// ============================================================================

/// Which conversations to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationFilter {
    /// Only conversations created in the last `days_back` days
    pub days_back: u32,
    /// Only conversations carrying this tag id
    pub tag_id: Option<String>,
}

impl Default for ConversationFilter {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            tag_id: None,
        }
    }
}

impl ConversationFilter {
    /// Query parameters for the first listing request, relative to `now`.
    pub fn query(&self, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("created_at_after", created_after(now, self.days_back).to_string()),
            ("per_page", CONVERSATIONS_PER_PAGE.to_string()),
        ];

        if let Some(tag) = self.tag_id.as_deref().filter(|t| !t.is_empty()) {
            params.push(("tag_id", tag.to_string()));
        }

        params
    }
}

/// Unix timestamp `days_back` days before `now`
pub fn created_after(now: DateTime<Utc>, days_back: u32) -> i64 {
    (now - Duration::days(i64::from(days_back))).timestamp()
}

/// Render a unix timestamp for display, or "-" when missing
pub fn format_timestamp(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_created_after_subtracts_days() {
        let expected = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap().timestamp();
        assert_eq!(created_after(now(), 30), expected);
        assert_eq!(created_after(now(), 0), now().timestamp());
    }

    #[test]
    fn test_query_without_tag() {
        let filter = ConversationFilter {
            days_back: 7,
            tag_id: None,
        };

        let expected_after = Utc.with_ymd_and_hms(2024, 7, 24, 12, 0, 0).unwrap().timestamp();
        assert_eq!(
            filter.query(now()),
            vec![
                ("created_at_after", expected_after.to_string()),
                ("per_page", "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_with_tag() {
        let filter = ConversationFilter {
            tag_id: Some("8812".to_string()),
            ..ConversationFilter::default()
        };

        let query = filter.query(now());
        assert_eq!(query.len(), 3);
        assert_eq!(query[2], ("tag_id", "8812".to_string()));
    }

    #[test]
    fn test_query_ignores_empty_tag() {
        let filter = ConversationFilter {
            tag_id: Some(String::new()),
            ..ConversationFilter::default()
        };

        assert_eq!(filter.query(now()).len(), 2);
    }

    #[test]
    fn test_conversation_deserialization() {
        let conversation: Conversation = serde_json::from_value(json!({
            "type": "conversation",
            "id": 1911149811,
            "created_at": 1719792000,
            "state": "open",
            "tags": {"type": "tag.list", "tags": [{"type": "tag", "id": "123", "name": "billing"}]},
            "source": {"type": "conversation", "body": "<p>Help</p>"},
            "conversation_parts": {
                "type": "conversation_part.list",
                "conversation_parts": [{"id": "1"}, {"id": "2"}],
                "total_count": 2
            },
            "priority": "not_priority"
        }))
        .unwrap();

        assert_eq!(conversation.id, "1911149811");
        assert_eq!(conversation.tag_names(), vec!["billing"]);
        assert_eq!(conversation.part_count(), 2);
        assert_eq!(conversation.extra["priority"], "not_priority");
    }

    #[test]
    fn test_conversation_without_tags_or_parts() {
        let conversation: Conversation =
            serde_json::from_value(json!({"id": "5", "created_at": null})).unwrap();

        assert!(conversation.tag_names().is_empty());
        assert_eq!(conversation.part_count(), 0);
        assert_eq!(conversation.created_at, None);
    }

    #[test]
    fn test_null_tags_and_names() {
        let conversation: Conversation =
            serde_json::from_value(json!({"id": "5", "tags": null})).unwrap();
        assert!(conversation.tag_names().is_empty());

        let conversation: Conversation = serde_json::from_value(json!({
            "id": "6",
            "tags": {"type": "tag.list", "tags": [{"id": "1", "name": null}]}
        }))
        .unwrap();
        assert_eq!(conversation.tag_names(), vec![""]);
    }

    #[test]
    fn test_tags_response() {
        let tags: TagsResponse = serde_json::from_value(json!({
            "type": "list",
            "data": [{"type": "tag", "id": 1, "name": "bug"}, {"type": "tag", "id": "2", "name": "vip"}]
        }))
        .unwrap();

        assert_eq!(
            tags.data,
            vec![
                Tag { id: "1".to_string(), name: "bug".to_string() },
                Tag { id: "2".to_string(), name: "vip".to_string() },
            ]
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Some(1719792000)), "2024-07-01 00:00");
        assert_eq!(format_timestamp(None), "-");
    }
}
