use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Channel, MessageType};
use crate::domain::lenient;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InboundMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InboundLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InboundReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InboundProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
/// Content of an inbound message, selected by `message_type`.
pub enum InboundContent {
    Text(String),
    Image(InboundMedia),
    Audio(InboundMedia),
    Video(InboundMedia),
    File(InboundMedia),
    Vcard(InboundMedia),
    Sticker(InboundMedia),
    Location(InboundLocation),
    Reply(InboundReply),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "InboundMessageJson", into = "InboundMessageJson")]
/// Inbound message webhook payload.
///
/// Unknown `channel` or `message_type` values decode to `None`, and so does the
/// content of an unknown message type.
pub struct InboundMessage {
    pub channel: Option<Channel>,
    pub message_uuid: Option<String>,
    pub to: Option<String>,
    pub from: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub message_type: Option<MessageType>,
    pub content: Option<InboundContent>,
    pub profile: Option<InboundProfile>,
    pub context: Option<Value>,
    pub extra: BTreeMap<String, Value>,
}

impl InboundMessage {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Channel-specific metadata block (e.g. `sms`, `whatsapp`), if present.
    pub fn channel_metadata(&self) -> Option<&Value> {
        self.channel
            .and_then(|channel| self.extra.get(channel.as_str()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct InboundMessageJson {
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    message_type: Option<MessageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<InboundMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<InboundMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video: Option<InboundMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<InboundMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vcard: Option<InboundMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sticker: Option<InboundMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<InboundLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply: Option<InboundReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile: Option<InboundProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl From<InboundMessageJson> for InboundMessage {
    fn from(json: InboundMessageJson) -> Self {
        let content = match json.message_type {
            Some(MessageType::Text) => json.text.map(InboundContent::Text),
            Some(MessageType::Image) => json.image.map(InboundContent::Image),
            Some(MessageType::Audio) => json.audio.map(InboundContent::Audio),
            Some(MessageType::Video) => json.video.map(InboundContent::Video),
            Some(MessageType::File) => json.file.map(InboundContent::File),
            Some(MessageType::Vcard) => json.vcard.map(InboundContent::Vcard),
            Some(MessageType::Sticker) => json.sticker.map(InboundContent::Sticker),
            Some(MessageType::Location) => json.location.map(InboundContent::Location),
            Some(MessageType::Reply) => json.reply.map(InboundContent::Reply),
            Some(MessageType::Unsupported) => Some(InboundContent::Unsupported),
            _ => None,
        };

        Self {
            channel: json.channel,
            message_uuid: json.message_uuid,
            to: json.to,
            from: json.from,
            timestamp: json.timestamp,
            message_type: json.message_type,
            content,
            profile: json.profile,
            context: json.context,
            extra: json.extra,
        }
    }
}

impl From<InboundMessage> for InboundMessageJson {
    fn from(message: InboundMessage) -> Self {
        let mut json = InboundMessageJson {
            channel: message.channel,
            message_uuid: message.message_uuid,
            to: message.to,
            from: message.from,
            timestamp: message.timestamp,
            message_type: message.message_type,
            profile: message.profile,
            context: message.context,
            extra: message.extra,
            ..Default::default()
        };
        match message.content {
            Some(InboundContent::Text(text)) => json.text = Some(text),
            Some(InboundContent::Image(media)) => json.image = Some(media),
            Some(InboundContent::Audio(media)) => json.audio = Some(media),
            Some(InboundContent::Video(media)) => json.video = Some(media),
            Some(InboundContent::File(media)) => json.file = Some(media),
            Some(InboundContent::Vcard(media)) => json.vcard = Some(media),
            Some(InboundContent::Sticker(media)) => json.sticker = Some(media),
            Some(InboundContent::Location(location)) => json.location = Some(location),
            Some(InboundContent::Reply(reply)) => json.reply = Some(reply),
            Some(InboundContent::Unsupported) | None => {}
        }
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_text_message() {
        let json = r#"{
            "channel": "sms",
            "message_uuid": "aaaaaaaa-bbbb-cccc-dddd-0123456789ab",
            "to": "447700900000",
            "from": "447700900001",
            "timestamp": "2020-01-01T14:00:00Z",
            "message_type": "text",
            "text": "Hello From Vonage!",
            "sms": {"num_messages": "2", "keyword": "HELLO"},
            "usage": {"currency": "EUR", "price": "0.0333"}
        }"#;
        let message = InboundMessage::from_json(json).unwrap();
        assert_eq!(message.channel, Some(Channel::Sms));
        assert_eq!(
            message.content,
            Some(InboundContent::Text("Hello From Vonage!".to_owned()))
        );
        assert_eq!(
            message.channel_metadata().and_then(|m| m.get("keyword")),
            Some(&Value::from("HELLO"))
        );
        assert!(message.extra.contains_key("usage"));
        assert_eq!(
            message.timestamp.unwrap().to_rfc3339(),
            "2020-01-01T14:00:00+00:00"
        );
    }

    #[test]
    fn decodes_location_message() {
        let json = r#"{
            "channel": "whatsapp",
            "message_type": "location",
            "location": {"lat": 51.5, "long": -0.12, "name": "Vonage"},
            "profile": {"name": "Jane Smith"}
        }"#;
        let message = InboundMessage::from_json(json).unwrap();
        match message.content {
            Some(InboundContent::Location(location)) => {
                assert_eq!(location.lat, Some(51.5));
                assert_eq!(location.name.as_deref(), Some("Vonage"));
            }
            other => panic!("unexpected content: {other:?}"),
        }
        assert_eq!(
            message.profile.and_then(|p| p.name).as_deref(),
            Some("Jane Smith")
        );
    }

    #[test]
    fn unknown_discriminators_decode_to_none() {
        let json = r#"{
            "channel": "carrier_pigeon",
            "message_type": "hologram",
            "hologram": {"url": "https://example.com"}
        }"#;
        let message = InboundMessage::from_json(json).unwrap();
        assert_eq!(message.channel, None);
        assert_eq!(message.message_type, None);
        assert_eq!(message.content, None);
        assert!(message.extra.contains_key("hologram"));
    }

    #[test]
    fn reserialization_is_stable() {
        let json = r#"{"channel":"messenger","message_uuid":"id-1","to":"page","from":"user","timestamp":"2020-01-01T14:00:00Z","message_type":"image","image":{"url":"https://example.com/a.png","caption":"cat"},"messenger":{"x":1}}"#;
        let message = InboundMessage::from_json(json).unwrap();
        let first = serde_json::to_string(&message).unwrap();
        let again = InboundMessage::from_json(&first).unwrap();
        assert_eq!(serde_json::to_string(&again).unwrap(), first);
        assert_eq!(again, message);
    }
}
