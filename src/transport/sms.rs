use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::{ApiFamily, AuthScheme, BaseUris, HttpMethod, HttpRequest, LegacyScalar, TransportError, endpoint};
use crate::domain::sms::{SendSms, SmsMessageResult, SmsResponse, SmsStatusCode};

const AUTH: &[AuthScheme] = &[AuthScheme::KeySecretForm];

#[derive(Debug, Clone, Deserialize)]
struct SmsJsonResponse {
    #[serde(rename = "message-count", default)]
    message_count: Option<LegacyScalar>,
    #[serde(default)]
    messages: Vec<SmsJsonMessage>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct SmsJsonMessage {
    #[serde(default)]
    to: Option<String>,
    #[serde(rename = "message-id", default)]
    message_id: Option<String>,
    status: LegacyScalar,
    #[serde(rename = "remaining-balance", default)]
    remaining_balance: Option<LegacyScalar>,
    #[serde(rename = "message-price", default)]
    message_price: Option<LegacyScalar>,
    #[serde(default)]
    network: Option<String>,
    #[serde(rename = "client-ref", default)]
    client_ref: Option<String>,
    #[serde(rename = "error-text", default)]
    error_text: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

pub(crate) fn send_sms_request(base: &BaseUris, request: &SendSms) -> Result<HttpRequest, TransportError> {
    let url = endpoint(&base.rest, &["sms", "json"])?;
    Ok(HttpRequest::new(ApiFamily::Sms, HttpMethod::Post, url, AUTH).form(encode_send_sms_form(request)))
}

pub(crate) fn encode_send_sms_form(request: &SendSms) -> Vec<(String, String)> {
    let options = request.options();
    let mut params = vec![
        ("from".to_owned(), request.from().as_str().to_owned()),
        ("to".to_owned(), request.to().as_str().to_owned()),
        ("text".to_owned(), request.text_body().to_owned()),
        ("type".to_owned(), options.encoding.as_str().to_owned()),
    ];

    if let Some(client_ref) = options.client_ref.as_ref() {
        params.push(("client-ref".to_owned(), client_ref.clone()));
    }
    if let Some(ttl) = options.ttl {
        params.push(("ttl".to_owned(), ttl.to_string()));
    }
    if options.status_report_req {
        params.push(("status-report-req".to_owned(), "1".to_owned()));
    }
    if let Some(callback) = options.callback.as_ref() {
        params.push(("callback".to_owned(), callback.to_string()));
    }
    if let Some(class) = options.message_class {
        params.push(("message-class".to_owned(), class.to_string()));
    }

    params
}

pub(crate) fn decode_send_sms_json_response(body: &[u8]) -> Result<SmsResponse, TransportError> {
    let parsed: SmsJsonResponse = serde_json::from_slice(body)?;
    let messages = parsed
        .messages
        .into_iter()
        .map(|message| SmsMessageResult {
            to: message.to,
            message_id: message.message_id,
            status: SmsStatusCode::new(message.status.as_i32().unwrap_or(-1)),
            remaining_balance: message.remaining_balance.map(LegacyScalar::into_string),
            message_price: message.message_price.map(LegacyScalar::into_string),
            network: message.network,
            client_ref: message.client_ref,
            error_text: message.error_text,
            extra: message.extra,
        })
        .collect::<Vec<_>>();

    let message_count = parsed
        .message_count
        .and_then(|count| count.as_i32())
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(messages.len() as u32);

    Ok(SmsResponse {
        message_count,
        messages,
        extra: parsed.extra,
    })
}
