use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Channel;
use crate::domain::lenient;
use crate::domain::problem::ProblemDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum MessageStatusKind {
    Submitted,
    Delivered,
    Rejected,
    Undeliverable,
    Read,
}

impl MessageStatusKind {
    /// Whether no further status updates are expected.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Rejected | Self::Undeliverable | Self::Read)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Decimal price as sent by Vonage (a string, to avoid float drift).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Delivery status webhook payload.
pub struct MessageStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<MessageStatusKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProblemDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<MessageUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel: Option<Channel>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MessageStatus {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Channel-specific metadata block (e.g. `sms`, `whatsapp`), if present.
    pub fn channel_metadata(&self) -> Option<&Value> {
        self.channel
            .and_then(|channel| self.extra.get(channel.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELIVERED: &str = r#"{
        "message_uuid": "aaaaaaaa-bbbb-cccc-dddd-0123456789ab",
        "to": "447700900000",
        "from": "447700900001",
        "timestamp": "2020-01-01T14:00:00.000Z",
        "status": "rejected",
        "error": {
            "type": "https://developer.nexmo.com/api-errors/messages-olympus#1000",
            "title": "1000",
            "detail": "Throttled",
            "instance": "bf0ca0bf927b3b52e3cb03217e1a1ddf"
        },
        "usage": {"currency": "EUR", "price": "0.0333"},
        "client_ref": "abc123",
        "channel": "sms",
        "destination": {"network_code": "12345"},
        "sms": {"count_total": "2"}
    }"#;

    #[test]
    fn decodes_status_with_error_and_usage() {
        let status = MessageStatus::from_json(DELIVERED).unwrap();
        assert_eq!(status.status, Some(MessageStatusKind::Rejected));
        assert!(status.status.unwrap().is_final());
        assert_eq!(
            status.error.as_ref().and_then(|e| e.title.as_deref()),
            Some("1000")
        );
        assert_eq!(
            status.usage.as_ref().and_then(|u| u.price.as_deref()),
            Some("0.0333")
        );
        assert_eq!(
            status.channel_metadata(),
            Some(&serde_json::json!({"count_total": "2"}))
        );
        assert!(status.extra.contains_key("destination"));
    }

    #[test]
    fn parsing_twice_yields_equal_values() {
        let first = MessageStatus::from_json(DELIVERED).unwrap();
        let second = MessageStatus::from_json(DELIVERED).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_status_is_none() {
        let status = MessageStatus::from_json(r#"{"status": "teleported"}"#).unwrap();
        assert_eq!(status.status, None);
        assert!(!MessageStatusKind::Submitted.is_final());
    }
}
