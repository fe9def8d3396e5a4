//! Transport layer: HTTP and wire-format details (serialization/deserialization).
//!
//! Every operation is described by an [`HttpRequest`]: method, absolute URL,
//! body and the authentication schemes it accepts. Credentials are applied by
//! the client layer; nothing here performs I/O.

pub(crate) mod conversation;
pub(crate) mod messages;
pub(crate) mod proactive_connect;
mod legacy;
pub(crate) mod sms;
pub(crate) mod subaccounts;
pub(crate) mod verify;
pub(crate) mod voice;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::domain::ProblemDetails;

pub(crate) use legacy::LegacyScalar;

pub(crate) const DEFAULT_API_BASE_URI: &str = "https://api.nexmo.com";
pub(crate) const DEFAULT_REST_BASE_URI: &str = "https://rest.nexmo.com";
pub(crate) const DEFAULT_API_EU_BASE_URI: &str = "https://api-eu.vonage.com";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base URI cannot carry a path: {0}")]
    InvalidBaseUri(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// API family an operation belongs to. Carried by API errors.
pub enum ApiFamily {
    Sms,
    Messages,
    Voice,
    Verify,
    Subaccounts,
    ProactiveConnect,
    Conversation,
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sms => "sms",
            Self::Messages => "messages",
            Self::Voice => "voice",
            Self::Verify => "verify",
            Self::Subaccounts => "subaccounts",
            Self::ProactiveConnect => "proactive connect",
            Self::Conversation => "conversation",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Authentication scheme an operation accepts.
pub enum AuthScheme {
    /// `api_key` and `api_secret` query parameters.
    KeySecretQuery,
    /// `api_key` and `api_secret` form fields.
    KeySecretForm,
    /// HTTP Basic with key and secret.
    Basic,
    /// Bearer JWT signed with the application private key.
    Jwt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RequestBody {
    Empty,
    Json(Vec<u8>),
    Form(Vec<(String, String)>),
    Multipart {
        field: &'static str,
        file_name: String,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone)]
/// Request descriptor produced by the per-family encoders.
pub(crate) struct HttpRequest {
    pub(crate) family: ApiFamily,
    pub(crate) method: HttpMethod,
    pub(crate) url: Url,
    pub(crate) headers: Vec<(&'static str, String)>,
    pub(crate) body: RequestBody,
    pub(crate) auth: &'static [AuthScheme],
}

impl HttpRequest {
    pub(crate) fn new(
        family: ApiFamily,
        method: HttpMethod,
        url: Url,
        auth: &'static [AuthScheme],
    ) -> Self {
        Self {
            family,
            method,
            url,
            headers: vec![("Accept", "application/json".to_owned())],
            body: RequestBody::Empty,
            auth,
        }
    }

    pub(crate) fn json(mut self, body: &impl Serialize) -> Result<Self, TransportError> {
        self.body = RequestBody::Json(serde_json::to_vec(body)?);
        self.headers
            .push(("Content-Type", "application/json".to_owned()));
        Ok(self)
    }

    pub(crate) fn form(mut self, params: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(params);
        self
    }

    pub(crate) fn accept(mut self, media_type: &str) -> Self {
        self.headers.retain(|(name, _)| *name != "Accept");
        self.headers.push(("Accept", media_type.to_owned()));
        self
    }
}

#[derive(Debug, Clone)]
/// Base URIs of the Vonage hosts.
pub(crate) struct BaseUris {
    pub(crate) api: Url,
    pub(crate) rest: Url,
    pub(crate) api_eu: Url,
}

impl BaseUris {
    pub(crate) fn defaults() -> Result<Self, TransportError> {
        Ok(Self {
            api: Url::parse(DEFAULT_API_BASE_URI)?,
            rest: Url::parse(DEFAULT_REST_BASE_URI)?,
            api_eu: Url::parse(DEFAULT_API_EU_BASE_URI)?,
        })
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = base.clone();
    url.set_query(None);
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| TransportError::InvalidBaseUri(base.to_string()))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

#[derive(Debug, Default)]
/// Query parameters with absent values left out entirely.
pub(crate) struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn opt(mut self, key: &'static str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    pub(crate) fn set(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub(crate) fn apply(self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (key, value) in self.pairs {
            query.append_pair(key, &value);
        }
    }
}

/// ISO-8601 instant with second precision, as expected by filter parameters.
pub(crate) fn format_instant(instant: chrono::DateTime<chrono::Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransportError> {
    Ok(serde_json::from_slice(body)?)
}

/// Problem detail of a failed response. Empty or malformed bodies yield the default.
pub(crate) fn decode_problem(body: &[u8]) -> ProblemDetails {
    if body.iter().all(u8::is_ascii_whitespace) {
        return ProblemDetails::default();
    }
    serde_json::from_slice(body).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_and_escapes_segments() {
        let base = Url::parse("https://api.nexmo.com").unwrap();
        let url = endpoint(&base, &["v1", "conversations", "CON 1/2"]).unwrap();
        assert_eq!(url.as_str(), "https://api.nexmo.com/v1/conversations/CON%201%2F2");

        let nested = Url::parse("http://127.0.0.1:8080/proxy/").unwrap();
        let url = endpoint(&nested, &["v1", "calls"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/proxy/v1/calls");
    }

    #[test]
    fn endpoint_rejects_non_hierarchical_base() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        assert!(matches!(
            endpoint(&base, &["v1"]),
            Err(TransportError::InvalidBaseUri(_))
        ));
    }

    #[test]
    fn query_omits_absent_values() {
        let mut url = Url::parse("https://api.nexmo.com/v1/users").unwrap();
        Query::new()
            .opt("page_size", Some(10))
            .opt("order", None::<&str>)
            .opt("cursor", None::<String>)
            .apply(&mut url);
        assert_eq!(url.as_str(), "https://api.nexmo.com/v1/users?page_size=10");

        let mut url = Url::parse("https://api.nexmo.com/v1/users").unwrap();
        Query::new().opt("name", None::<&str>).apply(&mut url);
        assert_eq!(url.as_str(), "https://api.nexmo.com/v1/users");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn problem_decoding_is_best_effort() {
        assert_eq!(decode_problem(b""), ProblemDetails::default());
        assert_eq!(decode_problem(b"<html>oops</html>"), ProblemDetails::default());
        let problem = decode_problem(br#"{"title":"Bad Request","extra_field":1}"#);
        assert_eq!(problem.title.as_deref(), Some("Bad Request"));
        assert!(problem.extra.contains_key("extra_field"));
    }

    #[test]
    fn instants_use_second_precision() {
        let instant = chrono::DateTime::parse_from_rfc3339("2023-06-01T10:20:30.123Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(format_instant(instant), "2023-06-01T10:20:30Z");
    }
}
