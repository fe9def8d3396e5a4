use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::lenient;
use crate::domain::pagination::{CursorFilter, HalLinks};
use crate::domain::validation::{ValidationError, require_non_blank};
use crate::domain::value::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
/// Event types with a fixed schema. Custom events use a `custom:` prefix.
pub enum ConversationEventType {
    #[serde(rename = "message")]
    Message,
    #[serde(rename = "message:submitted")]
    MessageSubmitted,
    #[serde(rename = "message:rejected")]
    MessageRejected,
    #[serde(rename = "message:undeliverable")]
    MessageUndeliverable,
    #[serde(rename = "message:delivered")]
    MessageDelivered,
    #[serde(rename = "message:seen")]
    MessageSeen,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "text:seen")]
    TextSeen,
    #[serde(rename = "text:delivered")]
    TextDelivered,
    #[serde(rename = "audio:play")]
    AudioPlay,
    #[serde(rename = "audio:say")]
    AudioSay,
    #[serde(rename = "audio:dtmf")]
    AudioDtmf,
    #[serde(rename = "audio:record")]
    AudioRecord,
    #[serde(rename = "audio:mute:on")]
    AudioMuteOn,
    #[serde(rename = "audio:mute:off")]
    AudioMuteOff,
    #[serde(rename = "member:invited")]
    MemberInvited,
    #[serde(rename = "member:joined")]
    MemberJoined,
    #[serde(rename = "member:left")]
    MemberLeft,
    #[serde(rename = "member:media")]
    MemberMedia,
    #[serde(rename = "conversation:updated")]
    ConversationUpdated,
    #[serde(rename = "leg:status:update")]
    LegStatusUpdate,
    #[serde(rename = "ephemeral")]
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_member: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Raw event type as sent by the server.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Member id of the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<EventEmbedded>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HalLinks>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ConversationEvent {
    /// Typed event kind; `None` for custom or unrecognised types.
    pub fn event_type(&self) -> Option<ConversationEventType> {
        let kind = self.kind.as_deref()?;
        serde_json::from_value(Value::from(kind)).ok()
    }

    /// Name of a `custom:` event, without the prefix.
    pub fn custom_name(&self) -> Option<&str> {
        self.kind.as_deref()?.strip_prefix("custom:")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventsEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<ConversationEvent>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
/// Event sent into a conversation.
pub struct CreateEvent {
    kind: String,
    from: MemberId,
    body: Option<Map<String, Value>>,
}

impl CreateEvent {
    /// `kind` must be a known event type or start with `custom:`.
    pub fn new(
        kind: impl Into<String>,
        from: MemberId,
        body: Option<Map<String, Value>>,
    ) -> Result<Self, ValidationError> {
        let kind = require_non_blank("type", kind)?;
        let custom = kind
            .strip_prefix("custom:")
            .is_some_and(|name| !name.is_empty());
        let known = serde_json::from_value::<ConversationEventType>(Value::from(kind.as_str())).is_ok();
        if !custom && !known {
            return Err(ValidationError::Invalid {
                field: "type",
                reason: "expected a known event type or a custom: event",
            });
        }
        Ok(Self { kind, from, body })
    }

    pub fn custom(
        name: &str,
        from: MemberId,
        body: Option<Map<String, Value>>,
    ) -> Result<Self, ValidationError> {
        Self::new(format!("custom:{name}"), from, body)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn from(&self) -> &MemberId {
        &self.from
    }

    pub fn body(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventsFilterOptions {
    pub start_id: Option<u64>,
    pub end_id: Option<u64>,
    pub event_type: Option<String>,
    pub exclude_deleted_events: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Query filter of a conversation's events.
pub struct ConversationEventsFilter {
    cursor: CursorFilter,
    options: EventsFilterOptions,
}

impl ConversationEventsFilter {
    pub fn new(cursor: CursorFilter, options: EventsFilterOptions) -> Result<Self, ValidationError> {
        if matches!((options.start_id, options.end_id), (Some(start), Some(end)) if end < start) {
            return Err(ValidationError::Invalid {
                field: "end_id",
                reason: "must not precede start_id",
            });
        }
        if let Some(event_type) = options.event_type.as_deref() {
            require_non_blank("event_type", event_type)?;
        }
        Ok(Self { cursor, options })
    }

    pub fn cursor(&self) -> &CursorFilter {
        &self.cursor
    }

    pub fn options(&self) -> &EventsFilterOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> MemberId {
        MemberId::new("MEM-1").unwrap()
    }

    #[test]
    fn create_event_accepts_known_and_custom_types() {
        assert!(CreateEvent::new("message", member(), None).is_ok());
        assert!(CreateEvent::new("audio:dtmf", member(), None).is_ok());
        assert!(CreateEvent::custom("order_shipped", member(), None).is_ok());
        assert!(CreateEvent::new("custom:", member(), None).is_err());
        assert!(CreateEvent::new("teleport", member(), None).is_err());
    }

    #[test]
    fn event_type_is_lenient() {
        let event: ConversationEvent = serde_json::from_str(
            r#"{"id": 1, "type": "member:joined", "from": "MEM-1", "timestamp": "2020-01-01T14:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.event_type(), Some(ConversationEventType::MemberJoined));

        let event: ConversationEvent =
            serde_json::from_str(r#"{"id": 2, "type": "custom:order_shipped", "body": {"n": 1}}"#)
                .unwrap();
        assert_eq!(event.event_type(), None);
        assert_eq!(event.custom_name(), Some("order_shipped"));
    }

    #[test]
    fn events_filter_rejects_inverted_ids() {
        let options = EventsFilterOptions {
            start_id: Some(10),
            end_id: Some(5),
            ..Default::default()
        };
        assert!(ConversationEventsFilter::new(CursorFilter::default(), options).is_err());
    }
}
