use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::domain::lenient;
use crate::domain::pagination::{CursorFilter, HalLinks};
use crate::domain::validation::{ValidationError, check_length};

pub const CONVERSATION_NAME_MAX: usize = 100;
pub const CONVERSATION_DISPLAY_NAME_MAX: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationState {
    Active,
    Inactive,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationTimestamp {
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub destroyed: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationProperties {
    /// Seconds after which an empty conversation is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_sort_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<ConversationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<ConversationTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ConversationProperties>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HalLinks>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationsEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversations: Option<Vec<Conversation>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationOptions {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub image_url: Option<Url>,
    pub properties: Option<ConversationProperties>,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Body of conversation create and update requests.
pub struct ConversationRequest {
    options: ConversationOptions,
}

impl ConversationRequest {
    pub fn new(options: ConversationOptions) -> Result<Self, ValidationError> {
        if let Some(name) = options.name.as_deref() {
            check_length("name", name, 1, CONVERSATION_NAME_MAX)?;
        }
        if let Some(display_name) = options.display_name.as_deref() {
            check_length("display_name", display_name, 1, CONVERSATION_DISPLAY_NAME_MAX)?;
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &ConversationOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Query filter of the conversations listing.
pub struct ConversationsFilter {
    cursor: CursorFilter,
    date_start: Option<DateTime<Utc>>,
    date_end: Option<DateTime<Utc>>,
}

impl ConversationsFilter {
    pub fn new(
        cursor: CursorFilter,
        date_start: Option<DateTime<Utc>>,
        date_end: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if matches!((date_start, date_end), (Some(start), Some(end)) if end < start) {
            return Err(ValidationError::Invalid {
                field: "date_end",
                reason: "must not precede date_start",
            });
        }
        Ok(Self {
            cursor,
            date_start,
            date_end,
        })
    }

    pub fn cursor(&self) -> &CursorFilter {
        &self.cursor
    }

    pub fn date_start(&self) -> Option<DateTime<Utc>> {
        self.date_start
    }

    pub fn date_end(&self) -> Option<DateTime<Utc>> {
        self.date_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_name_bounds() {
        let options = |name: &str| ConversationOptions {
            name: Some(name.to_owned()),
            ..Default::default()
        };
        assert!(ConversationRequest::new(options(&"x".repeat(100))).is_ok());
        assert!(ConversationRequest::new(options(&"x".repeat(101))).is_err());
        assert!(ConversationRequest::new(options("")).is_err());
        assert!(ConversationRequest::new(ConversationOptions::default()).is_ok());
    }

    #[test]
    fn conversation_decodes_with_unknown_state() {
        let json = r#"{
            "id": "CON-d66d47de-5bcb-4300-94f0-0c9d4b948e9a",
            "name": "customer_chat",
            "state": "ARCHIVED",
            "sequence_number": 0,
            "timestamp": {"created": "2019-09-03T18:40:24.324Z"},
            "properties": {"ttl": 60, "custom_data": {"crm": "42"}},
            "media_state": {"earmuff": false}
        }"#;
        let conversation: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conversation.state, None);
        assert!(conversation.timestamp.and_then(|t| t.created).is_some());
        assert_eq!(conversation.properties.and_then(|p| p.ttl), Some(60));
        assert!(conversation.extra.contains_key("media_state"));
    }

    #[test]
    fn filter_rejects_inverted_dates() {
        let start = DateTime::parse_from_rfc3339("2023-01-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let end = DateTime::parse_from_rfc3339("2023-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(ConversationsFilter::new(CursorFilter::default(), Some(start), Some(end)).is_err());
    }
}
