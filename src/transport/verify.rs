use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::{
    ApiFamily, AuthScheme, BaseUris, HttpMethod, HttpRequest, LegacyScalar, Query,
    TransportError, endpoint,
};
use crate::domain::VerifyRequestId;
use crate::domain::verify::{
    Psd2Request, VerifyCheck, VerifyCheckAttempt, VerifyCheckResponse, VerifyControlCommand,
    VerifyControlResponse, VerifyEvent, VerifyOptions, VerifyRequest, VerifyResponse,
    VerifySearchResponse, VerifyStatusCode,
};

const FORM_AUTH: &[AuthScheme] = &[AuthScheme::KeySecretForm];
const QUERY_AUTH: &[AuthScheme] = &[AuthScheme::KeySecretQuery];

#[derive(Debug, Deserialize)]
struct VerifyJsonResponse {
    #[serde(default)]
    request_id: Option<String>,
    status: LegacyScalar,
    #[serde(default)]
    error_text: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CheckJsonResponse {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    event_id: Option<String>,
    status: LegacyScalar,
    #[serde(default)]
    price: Option<LegacyScalar>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    estimated_price_messages_sent: Option<LegacyScalar>,
    #[serde(default)]
    error_text: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ControlJsonResponse {
    status: LegacyScalar,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    error_text: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SearchJsonResponse {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    sender_id: Option<String>,
    #[serde(default)]
    date_submitted: Option<String>,
    #[serde(default)]
    date_finalized: Option<String>,
    #[serde(default)]
    first_event_date: Option<String>,
    #[serde(default)]
    last_event_date: Option<String>,
    #[serde(default)]
    status: Option<LegacyScalar>,
    #[serde(default)]
    price: Option<LegacyScalar>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    estimated_price_messages_sent: Option<LegacyScalar>,
    #[serde(default)]
    error_text: Option<String>,
    #[serde(default)]
    checks: Vec<SearchCheckJson>,
    #[serde(default)]
    events: Vec<SearchEventJson>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SearchCheckJson {
    #[serde(default)]
    date_received: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SearchEventJson {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

fn status_of(scalar: &LegacyScalar) -> VerifyStatusCode {
    VerifyStatusCode::new(scalar.as_i32().unwrap_or(-1))
}

fn push_options(params: &mut Vec<(String, String)>, options: &VerifyOptions) {
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            params.push((key.to_owned(), value));
        }
    };
    push("country", options.country.clone());
    push("code_length", options.code_length.map(|v| v.to_string()));
    push("lg", options.lg.clone());
    push("pin_expiry", options.pin_expiry.map(|v| v.to_string()));
    push("next_event_wait", options.next_event_wait.map(|v| v.to_string()));
    push("workflow_id", options.workflow_id.map(|v| v.to_string()));
}

pub(crate) fn verify_request(
    base: &BaseUris,
    request: &VerifyRequest,
) -> Result<HttpRequest, TransportError> {
    let mut params = vec![
        ("number".to_owned(), request.number().as_str().to_owned()),
        ("brand".to_owned(), request.brand().to_owned()),
    ];
    if let Some(sender_id) = request.sender_id() {
        params.push(("sender_id".to_owned(), sender_id.as_str().to_owned()));
    }
    push_options(&mut params, request.options());

    let url = endpoint(&base.api, &["verify", "json"])?;
    Ok(HttpRequest::new(ApiFamily::Verify, HttpMethod::Post, url, FORM_AUTH).form(params))
}

pub(crate) fn psd2_request(
    base: &BaseUris,
    request: &Psd2Request,
) -> Result<HttpRequest, TransportError> {
    let mut params = vec![
        ("number".to_owned(), request.number().as_str().to_owned()),
        ("payee".to_owned(), request.payee().to_owned()),
        ("amount".to_owned(), request.amount().to_string()),
    ];
    push_options(&mut params, request.options());

    let url = endpoint(&base.api, &["verify", "psd2", "json"])?;
    Ok(HttpRequest::new(ApiFamily::Verify, HttpMethod::Post, url, FORM_AUTH).form(params))
}

pub(crate) fn check_request(
    base: &BaseUris,
    check: &VerifyCheck,
) -> Result<HttpRequest, TransportError> {
    let mut params = vec![
        ("request_id".to_owned(), check.request_id().as_str().to_owned()),
        ("code".to_owned(), check.code().to_owned()),
    ];
    if let Some(ip) = check.ip_address() {
        params.push(("ip_address".to_owned(), ip.to_owned()));
    }

    let url = endpoint(&base.api, &["verify", "check", "json"])?;
    Ok(HttpRequest::new(ApiFamily::Verify, HttpMethod::Post, url, FORM_AUTH).form(params))
}

pub(crate) fn control_request(
    base: &BaseUris,
    request_id: &VerifyRequestId,
    command: VerifyControlCommand,
) -> Result<HttpRequest, TransportError> {
    let params = vec![
        ("request_id".to_owned(), request_id.as_str().to_owned()),
        ("cmd".to_owned(), command.as_str().to_owned()),
    ];
    let url = endpoint(&base.api, &["verify", "control", "json"])?;
    Ok(HttpRequest::new(ApiFamily::Verify, HttpMethod::Post, url, FORM_AUTH).form(params))
}

pub(crate) fn search_request(
    base: &BaseUris,
    request_id: &VerifyRequestId,
) -> Result<HttpRequest, TransportError> {
    let mut url = endpoint(&base.api, &["verify", "search", "json"])?;
    Query::new()
        .set("request_id", request_id.as_str())
        .apply(&mut url);
    Ok(HttpRequest::new(ApiFamily::Verify, HttpMethod::Get, url, QUERY_AUTH))
}

pub(crate) fn decode_verify_response(body: &[u8]) -> Result<VerifyResponse, TransportError> {
    let parsed: VerifyJsonResponse = serde_json::from_slice(body)?;
    Ok(VerifyResponse {
        request_id: parsed.request_id.filter(|id| !id.is_empty()),
        status: status_of(&parsed.status),
        error_text: parsed.error_text,
        network: parsed.network,
        extra: parsed.extra,
    })
}

pub(crate) fn decode_check_response(body: &[u8]) -> Result<VerifyCheckResponse, TransportError> {
    let parsed: CheckJsonResponse = serde_json::from_slice(body)?;
    Ok(VerifyCheckResponse {
        request_id: parsed.request_id,
        event_id: parsed.event_id,
        status: status_of(&parsed.status),
        price: parsed.price.map(LegacyScalar::into_string),
        currency: parsed.currency,
        estimated_price_messages_sent: parsed
            .estimated_price_messages_sent
            .map(LegacyScalar::into_string),
        error_text: parsed.error_text,
        extra: parsed.extra,
    })
}

pub(crate) fn decode_control_response(body: &[u8]) -> Result<VerifyControlResponse, TransportError> {
    let parsed: ControlJsonResponse = serde_json::from_slice(body)?;
    Ok(VerifyControlResponse {
        status: status_of(&parsed.status),
        command: parsed.command,
        error_text: parsed.error_text,
        extra: parsed.extra,
    })
}

pub(crate) fn decode_search_response(body: &[u8]) -> Result<VerifySearchResponse, TransportError> {
    let parsed: SearchJsonResponse = serde_json::from_slice(body)?;
    Ok(VerifySearchResponse {
        request_id: parsed.request_id,
        account_id: parsed.account_id,
        number: parsed.number,
        sender_id: parsed.sender_id,
        date_submitted: parsed.date_submitted,
        date_finalized: parsed.date_finalized,
        first_event_date: parsed.first_event_date,
        last_event_date: parsed.last_event_date,
        status: parsed.status.map(LegacyScalar::into_string),
        price: parsed.price.map(LegacyScalar::into_string),
        currency: parsed.currency,
        estimated_price_messages_sent: parsed
            .estimated_price_messages_sent
            .map(LegacyScalar::into_string),
        error_text: parsed.error_text,
        checks: parsed
            .checks
            .into_iter()
            .map(|check| VerifyCheckAttempt {
                date_received: check.date_received,
                code: check.code,
                status: check.status,
                ip_address: check.ip_address,
                extra: check.extra,
            })
            .collect(),
        events: parsed
            .events
            .into_iter()
            .map(|event| VerifyEvent {
                kind: event.kind,
                id: event.id,
                extra: event.extra,
            })
            .collect(),
        extra: parsed.extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PhoneNumber;
    use crate::domain::verify::VerificationStatus;
    use crate::transport::RequestBody;

    fn form(request: &HttpRequest) -> &[(String, String)] {
        match &request.body {
            RequestBody::Form(params) => params,
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn verify_request_form() {
        let request = VerifyRequest::new(
            PhoneNumber::new("447700900000").unwrap(),
            "Acme Inc",
            None,
            VerifyOptions {
                code_length: Some(6),
                workflow_id: Some(6),
                ..Default::default()
            },
        )
        .unwrap();
        let http = verify_request(&BaseUris::defaults().unwrap(), &request).unwrap();

        assert_eq!(http.url.as_str(), "https://api.nexmo.com/verify/json");
        assert_eq!(http.auth, FORM_AUTH);
        assert_eq!(
            form(&http),
            &[
                ("number".to_owned(), "447700900000".to_owned()),
                ("brand".to_owned(), "Acme Inc".to_owned()),
                ("code_length".to_owned(), "6".to_owned()),
                ("workflow_id".to_owned(), "6".to_owned()),
            ]
        );
    }

    #[test]
    fn control_and_search_requests() {
        let base = BaseUris::defaults().unwrap();
        let id = VerifyRequestId::new("abcdef0123456789abcdef0123456789").unwrap();

        let http = control_request(&base, &id, VerifyControlCommand::TriggerNextEvent).unwrap();
        assert_eq!(http.url.as_str(), "https://api.nexmo.com/verify/control/json");
        assert!(form(&http).contains(&("cmd".to_owned(), "trigger_next_event".to_owned())));

        let http = search_request(&base, &id).unwrap();
        assert_eq!(http.method, HttpMethod::Get);
        assert_eq!(
            http.url.as_str(),
            "https://api.nexmo.com/verify/search/json?request_id=abcdef0123456789abcdef0123456789"
        );
        assert_eq!(http.auth, QUERY_AUTH);
    }

    #[test]
    fn decode_failed_request_status() {
        let response = decode_verify_response(
            br#"{"request_id":"","status":"3","error_text":"Invalid value for param: number"}"#,
        )
        .unwrap();
        assert_eq!(response.request_id, None);
        assert_eq!(response.status.as_i32(), 3);
        assert!(!response.status.is_success());
    }

    #[test]
    fn decode_check_keeps_price_text() {
        let response = decode_check_response(
            br#"{"request_id":"abc","event_id":"0A00000012345678","status":"0","price":"0.10000000","currency":"EUR","estimated_price_messages_sent":"0.03330000"}"#,
        )
        .unwrap();
        assert!(response.status.is_success());
        assert_eq!(response.price.as_deref(), Some("0.10000000"));
    }

    #[test]
    fn decode_search_with_checks() {
        let response = decode_search_response(
            br#"{
                "request_id": "abc",
                "status": "SUCCESS",
                "price": "0.10000000",
                "checks": [{"date_received": "2020-01-01 12:00:00", "code": "1234", "status": "VALID", "ip_address": ""}],
                "events": [{"type": "sms", "id": "0A000000"}]
            }"#,
        )
        .unwrap();
        assert_eq!(response.verification_status(), Some(VerificationStatus::Success));
        assert_eq!(response.error_status(), None);
        assert_eq!(response.checks.len(), 1);
        assert_eq!(response.events[0].kind.as_deref(), Some("sms"));

        let failed = decode_search_response(br#"{"status": 101, "error_text": "No response found"}"#)
            .unwrap();
        assert_eq!(failed.error_status().map(|s| s.as_i32()), Some(101));
    }

    #[test]
    fn decoders_keep_unknown_properties() {
        let response = decode_verify_response(
            br#"{"request_id":"abc","status":"0","network_type":"mobile"}"#,
        )
        .unwrap();
        assert_eq!(response.extra.get("network_type"), Some(&Value::from("mobile")));

        let response = decode_check_response(
            br#"{"request_id":"abc","status":"0","event_id":"0A00","charged":true}"#,
        )
        .unwrap();
        assert_eq!(response.extra.get("charged"), Some(&Value::from(true)));
        assert!(!response.extra.contains_key("event_id"));

        let response =
            decode_control_response(br#"{"status":"0","command":"cancel","request_id":"abc"}"#)
                .unwrap();
        assert_eq!(response.extra.get("request_id"), Some(&Value::from("abc")));
    }

    #[test]
    fn decode_search_keeps_nested_unknown_properties() {
        let response = decode_search_response(
            br#"{
                "request_id": "abc",
                "status": "FAILED",
                "workflow_id": 6,
                "checks": [{"code": "0000", "status": "INVALID", "attempt": 2}],
                "events": [{"type": "tts", "id": "0A000001", "price": "0.05"}]
            }"#,
        )
        .unwrap();
        assert_eq!(response.extra.get("workflow_id"), Some(&Value::from(6)));
        assert_eq!(response.checks[0].extra.get("attempt"), Some(&Value::from(2)));
        assert_eq!(response.events[0].extra.get("price"), Some(&Value::from("0.05")));
        assert!(!response.events[0].extra.contains_key("type"));
    }
}
