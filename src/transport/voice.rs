use serde::Serialize;
use url::Url;

use super::{
    ApiFamily, AuthScheme, BaseUris, HttpMethod, HttpRequest, Query, TransportError, decode_json,
    endpoint, format_instant,
};
use crate::domain::voice::{
    AdvancedMachineDetection, CallInfo, CallInstructions, CallModification, CallResponse,
    CallsEmbedded, CallsFilter, CreateCall, Endpoint, EventMethod, MachineDetection, ModifyCall,
    Ncco, PhoneEndpoint,
};
use crate::domain::{CallId, HalPage};

const AUTH: &[AuthScheme] = &[AuthScheme::Jwt];

#[derive(Debug, Serialize)]
struct PhoneFromWire<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    endpoint: &'a PhoneEndpoint,
}

#[derive(Debug, Serialize)]
struct CreateCallWire<'a> {
    to: [&'a Endpoint; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<PhoneFromWire<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    random_from_number: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ncco: Option<&'a Ncco>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer_url: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer_method: Option<EventMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_url: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_method: Option<EventMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    machine_detection: Option<MachineDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advanced_machine_detection: Option<&'a AdvancedMachineDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length_timer: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ringing_timer: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ModifyCallWire<'a> {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<DestinationWire<'a>>,
}

#[derive(Debug, Serialize)]
struct DestinationWire<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ncco: Option<&'a Ncco>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<[&'a str; 1]>,
}

pub(crate) fn create_call_request(
    base: &BaseUris,
    request: &CreateCall,
) -> Result<HttpRequest, TransportError> {
    let options = request.options();
    let (ncco, answer_url, answer_method) = match request.instructions() {
        CallInstructions::Ncco(ncco) => (Some(ncco), None, None),
        CallInstructions::AnswerUrl { url, method } => (None, Some([url.as_str()]), *method),
    };
    let wire = CreateCallWire {
        to: [request.to()],
        from: options.from.as_ref().map(|endpoint| PhoneFromWire {
            kind: "phone",
            endpoint,
        }),
        random_from_number: options.random_from_number.filter(|random| *random),
        ncco,
        answer_url,
        answer_method,
        event_url: options.event_url.as_ref().map(|url| [url.as_str()]),
        event_method: options.event_method,
        machine_detection: options.machine_detection,
        advanced_machine_detection: options.advanced_machine_detection.as_ref(),
        length_timer: options.length_timer,
        ringing_timer: options.ringing_timer,
    };

    let url = endpoint(&base.api, &["v1", "calls"])?;
    HttpRequest::new(ApiFamily::Voice, HttpMethod::Post, url, AUTH).json(&wire)
}

pub(crate) fn get_call_request(base: &BaseUris, call: &CallId) -> Result<HttpRequest, TransportError> {
    let url = endpoint(&base.api, &["v1", "calls", call.as_str()])?;
    Ok(HttpRequest::new(ApiFamily::Voice, HttpMethod::Get, url, AUTH))
}

pub(crate) fn list_calls_request(
    base: &BaseUris,
    filter: &CallsFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = endpoint(&base.api, &["v1", "calls"])?;
    Query::new()
        .opt("status", filter.status().map(|status| status.as_str()))
        .opt("date_start", filter.date_start().map(format_instant))
        .opt("date_end", filter.date_end().map(format_instant))
        .opt("page_size", filter.page_size())
        .opt("record_index", filter.record_index())
        .opt("order", filter.order().map(|order| order.as_str()))
        .opt("conversation_uuid", filter.conversation_uuid())
        .apply(&mut url);
    Ok(HttpRequest::new(ApiFamily::Voice, HttpMethod::Get, url, AUTH))
}

pub(crate) fn modify_call_request(
    base: &BaseUris,
    modification: &CallModification,
) -> Result<HttpRequest, TransportError> {
    let action = modification.action();
    let destination = match action {
        ModifyCall::TransferNcco(ncco) => Some(DestinationWire {
            kind: "ncco",
            ncco: Some(ncco),
            url: None,
        }),
        ModifyCall::TransferUrl(url) => Some(DestinationWire {
            kind: "ncco",
            ncco: None,
            url: Some([url.as_str()]),
        }),
        _ => None,
    };
    let wire = ModifyCallWire {
        action: action.action(),
        destination,
    };

    let url = endpoint(&base.api, &["v1", "calls", modification.call().as_str()])?;
    HttpRequest::new(ApiFamily::Voice, HttpMethod::Put, url, AUTH).json(&wire)
}

/// Recording URLs are absolute and come from the recording webhook.
pub(crate) fn download_recording_request(recording_url: &Url) -> HttpRequest {
    HttpRequest::new(ApiFamily::Voice, HttpMethod::Get, recording_url.clone(), AUTH)
        .accept("*/*")
}

pub(crate) fn decode_call_response(body: &[u8]) -> Result<CallResponse, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_call_info(body: &[u8]) -> Result<CallInfo, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_calls_page(body: &[u8]) -> Result<HalPage<CallsEmbedded>, TransportError> {
    decode_json(body)
}
