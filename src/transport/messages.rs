use serde::Serialize;
use serde_json::{Map, Value};

use super::{ApiFamily, AuthScheme, BaseUris, HttpMethod, HttpRequest, TransportError, decode_json, endpoint};
use crate::domain::messages::{
    MediaPayload, MessageContent, MessageResponse, MessengerSettings, SendMessage, SmsSettings,
    StickerPayload, TemplatePayload, ViberSettings, WebhookVersion, WhatsappSettings,
};

const AUTH: &[AuthScheme] = &[AuthScheme::Jwt, AuthScheme::Basic];

#[derive(Debug, Serialize)]
struct MessageWire<'a> {
    message_type: &'static str,
    channel: &'static str,
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a MediaPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<&'a MediaPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<&'a MediaPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a MediaPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vcard: Option<&'a MediaPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<&'a TemplatePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sticker: Option<&'a StickerPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_ref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_version: Option<WebhookVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sms: Option<&'a SmsSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    whatsapp: Option<&'a WhatsappSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    messenger: Option<&'a MessengerSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    viber_service: Option<&'a ViberSettings>,
}

impl<'a> MessageWire<'a> {
    fn from_request(request: &'a SendMessage) -> Self {
        let options = request.options();
        let mut wire = Self {
            message_type: request.message_type().as_str(),
            channel: request.channel().as_str(),
            from: request.from(),
            to: request.to(),
            text: None,
            image: None,
            audio: None,
            video: None,
            file: None,
            vcard: None,
            template: None,
            sticker: None,
            custom: None,
            client_ref: options.client_ref.as_deref(),
            webhook_url: options.webhook_url.as_ref().map(|url| url.as_str()),
            webhook_version: options.webhook_version,
            ttl: options.ttl,
            sms: options.sms.as_ref(),
            whatsapp: options.whatsapp.as_ref(),
            messenger: options.messenger.as_ref(),
            viber_service: options.viber.as_ref(),
        };

        match request.content() {
            MessageContent::Text(text) => wire.text = Some(text),
            MessageContent::Image(media) => wire.image = Some(media),
            MessageContent::Audio(media) => wire.audio = Some(media),
            MessageContent::Video(media) => wire.video = Some(media),
            MessageContent::File(media) => wire.file = Some(media),
            MessageContent::Vcard(media) => wire.vcard = Some(media),
            MessageContent::Template(template) => wire.template = Some(template),
            MessageContent::Sticker(sticker) => wire.sticker = Some(sticker),
            MessageContent::Custom(custom) => wire.custom = Some(custom),
        }

        wire
    }
}

pub(crate) fn send_message_request(
    base: &BaseUris,
    request: &SendMessage,
) -> Result<HttpRequest, TransportError> {
    let url = endpoint(&base.api, &["v1", "messages"])?;
    HttpRequest::new(ApiFamily::Messages, HttpMethod::Post, url, AUTH)
        .json(&MessageWire::from_request(request))
}

pub(crate) fn decode_message_response(body: &[u8]) -> Result<MessageResponse, TransportError> {
    decode_json(body)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::domain::messages::{Channel, MessageOptions, ViberCategory};
    use crate::transport::RequestBody;

    fn body(request: &HttpRequest) -> String {
        match &request.body {
            RequestBody::Json(bytes) => String::from_utf8(bytes.clone()).unwrap(),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn sms_text_body_is_minimal() {
        let message = SendMessage::sms_text("447900000009", "12002009000", "Hello, World!").unwrap();
        let request = send_message_request(&BaseUris::defaults().unwrap(), &message).unwrap();

        assert_eq!(request.url.as_str(), "https://api.nexmo.com/v1/messages");
        assert_eq!(request.auth, AUTH);
        assert_eq!(
            body(&request),
            r#"{"message_type":"text","channel":"sms","from":"447900000009","to":"12002009000","text":"Hello, World!"}"#
        );
    }

    #[test]
    fn media_and_channel_settings() {
        let image = MediaPayload::new(Url::parse("https://example.com/cat.jpg").unwrap())
            .with_caption("a cat");
        let options = MessageOptions {
            client_ref: Some("ref-1".to_owned()),
            viber: Some(ViberSettings {
                category: Some(ViberCategory::Transaction),
                ttl: Some(600),
                kind: None,
            }),
            ..Default::default()
        };
        let message = SendMessage::new(
            Channel::ViberService,
            "Vonage",
            "12002009000",
            MessageContent::Image(image),
            options,
        )
        .unwrap();
        let request = send_message_request(&BaseUris::defaults().unwrap(), &message).unwrap();

        assert_eq!(
            body(&request),
            r#"{"message_type":"image","channel":"viber_service","from":"Vonage","to":"12002009000","image":{"url":"https://example.com/cat.jpg","caption":"a cat"},"client_ref":"ref-1","viber_service":{"category":"transaction","ttl":600}}"#
        );
    }

    #[test]
    fn decode_accepted_response_keeps_unknown_fields() {
        let response = decode_message_response(
            br#"{"message_uuid":"aaaaaaaa-bbbb-cccc-dddd-0123456789ab","workflow_id":"w-1"}"#,
        )
        .unwrap();
        assert_eq!(response.message_uuid, "aaaaaaaa-bbbb-cccc-dddd-0123456789ab");
        assert!(response.extra.contains_key("workflow_id"));
    }
}
