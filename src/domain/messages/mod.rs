//! Messages API (`/v1/messages`): multi-channel outbound messages and webhooks.

mod inbound;
mod status;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::domain::validation::{ValidationError, check_length, check_range, require_non_blank};
use crate::domain::value::{PhoneNumber, SenderId};

pub use inbound::{InboundContent, InboundLocation, InboundMedia, InboundMessage, InboundProfile};
pub use status::{MessageStatus, MessageStatusKind, MessageUsage};

/// Maximum `client_ref` length.
pub const MESSAGE_CLIENT_REF_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Sms,
    Mms,
    Whatsapp,
    Messenger,
    ViberService,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Mms => "mms",
            Self::Whatsapp => "whatsapp",
            Self::Messenger => "messenger",
            Self::ViberService => "viber_service",
        }
    }

    /// Whether `message_type` may be sent on this channel.
    pub fn supports(self, message_type: MessageType) -> bool {
        use MessageType as T;
        match self {
            Self::Sms => matches!(message_type, T::Text),
            Self::Mms => matches!(message_type, T::Image | T::Vcard | T::Audio | T::Video),
            Self::Whatsapp => matches!(
                message_type,
                T::Text
                    | T::Image
                    | T::Audio
                    | T::Video
                    | T::File
                    | T::Template
                    | T::Sticker
                    | T::Custom
            ),
            Self::Messenger => matches!(
                message_type,
                T::Text | T::Image | T::Audio | T::Video | T::File
            ),
            Self::ViberService => matches!(message_type, T::Text | T::Image | T::Video | T::File),
        }
    }

    fn max_text_len(self) -> usize {
        match self {
            Self::Sms | Self::Mms | Self::ViberService => 1000,
            Self::Whatsapp => 4096,
            Self::Messenger => 640,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MessageType {
    Text,
    Image,
    Audio,
    Video,
    File,
    Vcard,
    Template,
    Sticker,
    Custom,
    Location,
    Reply,
    Unsupported,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::File => "file",
            Self::Vcard => "vcard",
            Self::Template => "template",
            Self::Sticker => "sticker",
            Self::Custom => "custom",
            Self::Location => "location",
            Self::Reply => "reply",
            Self::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Media attachment (`image`, `audio`, `video`, `file`, `vcard`).
pub struct MediaPayload {
    pub url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MediaPayload {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            caption: None,
            name: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// WhatsApp template reference.
pub struct TemplatePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StickerPayload {
    Url(Url),
    Id(String),
}

#[derive(Debug, Clone, PartialEq)]
/// Outbound message content. The variant determines `message_type`.
pub enum MessageContent {
    Text(String),
    Image(MediaPayload),
    Audio(MediaPayload),
    Video(MediaPayload),
    File(MediaPayload),
    Vcard(MediaPayload),
    Template(TemplatePayload),
    Sticker(StickerPayload),
    Custom(serde_json::Map<String, Value>),
}

impl MessageContent {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Text(_) => MessageType::Text,
            Self::Image(_) => MessageType::Image,
            Self::Audio(_) => MessageType::Audio,
            Self::Video(_) => MessageType::Video,
            Self::File(_) => MessageType::File,
            Self::Vcard(_) => MessageType::Vcard,
            Self::Template(_) => MessageType::Template,
            Self::Sticker(_) => MessageType::Sticker,
            Self::Custom(_) => MessageType::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookVersion {
    #[serde(rename = "v0.1")]
    V0_1,
    #[serde(rename = "v1")]
    V1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsEncodingType {
    Text,
    Unicode,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SmsSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_type: Option<SmsEncodingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WhatsappPolicy {
    Deterministic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsappSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<WhatsappPolicy>,
    /// BCP 47 locale of the template, e.g. `en_GB`.
    pub locale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessengerCategory {
    Response,
    Update,
    MessageTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MessengerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MessengerCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViberCategory {
    Transaction,
    Promotion,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ViberSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ViberCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default)]
/// Optional fields of an outbound message.
///
/// Channel settings must match the channel they are sent on.
pub struct MessageOptions {
    pub client_ref: Option<String>,
    pub webhook_url: Option<Url>,
    pub webhook_version: Option<WebhookVersion>,
    /// Delivery window in seconds (SMS and MMS only).
    pub ttl: Option<u32>,
    pub sms: Option<SmsSettings>,
    pub whatsapp: Option<WhatsappSettings>,
    pub messenger: Option<MessengerSettings>,
    pub viber: Option<ViberSettings>,
}

#[derive(Debug, Clone)]
/// Validated outbound message for `POST /v1/messages`.
pub struct SendMessage {
    channel: Channel,
    from: String,
    to: String,
    content: MessageContent,
    options: MessageOptions,
}

impl SendMessage {
    pub const TTL_MIN: u32 = 300;
    pub const TTL_MAX: u32 = 259_200;
    pub const VIBER_TTL_MIN: u32 = 30;

    /// Validate and build an outbound message.
    ///
    /// `from` and `to` are sanitized as phone numbers where the channel requires
    /// them (SMS and MMS senders may also be alphanumeric).
    pub fn new(
        channel: Channel,
        from: impl Into<String>,
        to: impl Into<String>,
        content: MessageContent,
        options: MessageOptions,
    ) -> Result<Self, ValidationError> {
        let message_type = content.message_type();
        if !channel.supports(message_type) {
            return Err(ValidationError::UnsupportedMessageType {
                channel: channel.as_str(),
                message_type: message_type.as_str(),
            });
        }

        let (from, to) = validate_parties(channel, from.into(), to.into())?;
        validate_content(channel, &content, &options)?;
        validate_options(channel, &options)?;

        Ok(Self {
            channel,
            from,
            to,
            content,
            options,
        })
    }

    /// SMS text message with default options.
    pub fn sms_text(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            Channel::Sms,
            from,
            to,
            MessageContent::Text(text.into()),
            MessageOptions::default(),
        )
    }

    /// WhatsApp text message with default options.
    pub fn whatsapp_text(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            Channel::Whatsapp,
            from,
            to,
            MessageContent::Text(text.into()),
            MessageOptions::default(),
        )
    }

    /// MMS image with default options.
    pub fn mms_image(
        from: impl Into<String>,
        to: impl Into<String>,
        image: MediaPayload,
    ) -> Result<Self, ValidationError> {
        Self::new(
            Channel::Mms,
            from,
            to,
            MessageContent::Image(image),
            MessageOptions::default(),
        )
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn message_type(&self) -> MessageType {
        self.content.message_type()
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn options(&self) -> &MessageOptions {
        &self.options
    }
}

fn validate_parties(
    channel: Channel,
    from: String,
    to: String,
) -> Result<(String, String), ValidationError> {
    match channel {
        Channel::Sms | Channel::Mms => Ok((
            SenderId::new(from)?.as_str().to_owned(),
            PhoneNumber::new(to)?.as_str().to_owned(),
        )),
        Channel::Whatsapp => Ok((
            phone_field("from", from)?,
            PhoneNumber::new(to)?.as_str().to_owned(),
        )),
        Channel::ViberService => Ok((
            require_non_blank("from", from)?,
            PhoneNumber::new(to)?.as_str().to_owned(),
        )),
        Channel::Messenger => Ok((
            require_non_blank("from", from)?,
            require_non_blank("to", to)?,
        )),
    }
}

fn phone_field(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(PhoneNumber::new(value)?.as_str().to_owned())
}

fn validate_content(
    channel: Channel,
    content: &MessageContent,
    options: &MessageOptions,
) -> Result<(), ValidationError> {
    match content {
        MessageContent::Text(text) => check_length("text", text, 1, channel.max_text_len()),
        MessageContent::Template(template) => {
            require_non_blank("template.name", template.name.as_str())?;
            if options.whatsapp.is_none() {
                return Err(ValidationError::Requires {
                    field: "template",
                    requires: "whatsapp.locale",
                });
            }
            Ok(())
        }
        MessageContent::Sticker(StickerPayload::Id(id)) => {
            require_non_blank("sticker.id", id.as_str()).map(|_| ())
        }
        MessageContent::Custom(custom) if custom.is_empty() => {
            Err(ValidationError::Empty { field: "custom" })
        }
        _ => Ok(()),
    }
}

fn validate_options(channel: Channel, options: &MessageOptions) -> Result<(), ValidationError> {
    if let Some(client_ref) = options.client_ref.as_deref() {
        check_length("client_ref", client_ref, 1, MESSAGE_CLIENT_REF_MAX)?;
    }
    if let Some(ttl) = options.ttl {
        if !matches!(channel, Channel::Sms | Channel::Mms) {
            return Err(ValidationError::Invalid {
                field: "ttl",
                reason: "only valid on the sms and mms channels",
            });
        }
        check_range(
            "ttl",
            i64::from(ttl),
            i64::from(SendMessage::TTL_MIN),
            i64::from(SendMessage::TTL_MAX),
        )?;
    }
    if options.sms.is_some() && channel != Channel::Sms {
        return Err(ValidationError::Invalid {
            field: "sms",
            reason: "only valid on the sms channel",
        });
    }
    if let Some(whatsapp) = options.whatsapp.as_ref() {
        if channel != Channel::Whatsapp {
            return Err(ValidationError::Invalid {
                field: "whatsapp",
                reason: "only valid on the whatsapp channel",
            });
        }
        require_non_blank("whatsapp.locale", whatsapp.locale.as_str())?;
    }
    if let Some(messenger) = options.messenger.as_ref() {
        if channel != Channel::Messenger {
            return Err(ValidationError::Invalid {
                field: "messenger",
                reason: "only valid on the messenger channel",
            });
        }
        if messenger.category == Some(MessengerCategory::MessageTag) && messenger.tag.is_none() {
            return Err(ValidationError::Requires {
                field: "messenger.category",
                requires: "messenger.tag",
            });
        }
    }
    if let Some(viber) = options.viber.as_ref() {
        if channel != Channel::ViberService {
            return Err(ValidationError::Invalid {
                field: "viber_service",
                reason: "only valid on the viber_service channel",
            });
        }
        if let Some(ttl) = viber.ttl {
            check_range(
                "viber_service.ttl",
                i64::from(ttl),
                i64::from(SendMessage::VIBER_TTL_MIN),
                i64::from(SendMessage::TTL_MAX),
            )?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Accepted message (`202 Accepted`).
pub struct MessageResponse {
    pub message_uuid: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
