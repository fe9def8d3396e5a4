use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::domain::validation::{ValidationError, require_non_blank};
use crate::domain::value::PhoneNumber;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// What a `connect` or `transfer` action connects the call to.
pub enum Endpoint {
    Phone(PhoneEndpoint),
    Sip(SipEndpoint),
    Websocket(WebSocketEndpoint),
    Vbc(VbcEndpoint),
    App(AppEndpoint),
}

impl From<PhoneEndpoint> for Endpoint {
    fn from(value: PhoneEndpoint) -> Self {
        Self::Phone(value)
    }
}

impl From<SipEndpoint> for Endpoint {
    fn from(value: SipEndpoint) -> Self {
        Self::Sip(value)
    }
}

impl From<WebSocketEndpoint> for Endpoint {
    fn from(value: WebSocketEndpoint) -> Self {
        Self::Websocket(value)
    }
}

impl From<VbcEndpoint> for Endpoint {
    fn from(value: VbcEndpoint) -> Self {
        Self::Vbc(value)
    }
}

impl From<AppEndpoint> for Endpoint {
    fn from(value: AppEndpoint) -> Self {
        Self::App(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnAnswer {
    pub url: Url,
    #[serde(rename = "ringbackTone", skip_serializing_if = "Option::is_none")]
    pub ringback_tone: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneOptions {
    /// Digits sent after the call is answered (`0-9`, `*`, `#`, `p` for a pause).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtmf_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_answer: Option<OnAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shaken: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneEndpoint {
    number: PhoneNumber,
    #[serde(flatten)]
    options: PhoneOptions,
}

impl PhoneEndpoint {
    pub fn new(number: PhoneNumber, options: PhoneOptions) -> Result<Self, ValidationError> {
        if let Some(dtmf) = options.dtmf_answer.as_deref() {
            let valid = !dtmf.is_empty()
                && dtmf
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '*' | '#' | 'p'));
            if !valid {
                return Err(ValidationError::Invalid {
                    field: "dtmfAnswer",
                    reason: "expected digits, '*', '#' or 'p'",
                });
            }
        }
        Ok(Self { number, options })
    }

    /// Phone endpoint without options.
    pub fn number(number: PhoneNumber) -> Self {
        Self {
            number,
            options: PhoneOptions::default(),
        }
    }

    pub fn phone_number(&self) -> &PhoneNumber {
        &self.number
    }

    pub fn options(&self) -> &PhoneOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SipStandardHeaders {
    #[serde(rename = "User-to-User")]
    pub user_to_user: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Settings for a SIP endpoint: either a full `uri`, or a `domain`
/// (optionally with a `user`).
pub struct SipOptions {
    pub uri: Option<String>,
    pub domain: Option<String>,
    pub user: Option<String>,
    pub headers: BTreeMap<String, Value>,
    pub standard_headers: Option<SipStandardHeaders>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    standard_headers: Option<SipStandardHeaders>,
}

impl SipEndpoint {
    pub fn new(options: SipOptions) -> Result<Self, ValidationError> {
        let uri = options.uri.map(|v| require_non_blank("uri", v)).transpose()?;
        let domain = options
            .domain
            .map(|v| require_non_blank("domain", v))
            .transpose()?;
        let user = options.user.map(|v| require_non_blank("user", v)).transpose()?;

        if uri.is_some() && domain.is_some() {
            return Err(ValidationError::Conflict {
                field: "domain",
                other: "uri",
            });
        }
        if user.is_some() && uri.is_some() {
            return Err(ValidationError::Conflict {
                field: "user",
                other: "uri",
            });
        }
        if user.is_some() && domain.is_none() {
            return Err(ValidationError::Requires {
                field: "user",
                requires: "domain",
            });
        }
        if uri.is_none() && domain.is_none() {
            return Err(ValidationError::Empty { field: "uri" });
        }

        Ok(Self {
            uri,
            domain,
            user,
            headers: options.headers,
            standard_headers: options.standard_headers,
        })
    }

    /// SIP endpoint addressed by URI.
    pub fn uri(uri: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(SipOptions {
            uri: Some(uri.into()),
            ..Default::default()
        })
    }

    pub fn uri_str(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebSocketEndpoint {
    uri: Url,
    #[serde(rename = "content-type")]
    content_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, Value>,
}

impl WebSocketEndpoint {
    /// Default audio content type.
    pub const L16_16K: &'static str = "audio/l16;rate=16000";

    pub fn new(
        uri: Url,
        content_type: impl Into<String>,
        headers: BTreeMap<String, Value>,
    ) -> Result<Self, ValidationError> {
        if !matches!(uri.scheme(), "ws" | "wss") {
            return Err(ValidationError::Invalid {
                field: "uri",
                reason: "expected a ws:// or wss:// URL",
            });
        }
        Ok(Self {
            uri,
            content_type: require_non_blank("content-type", content_type)?,
            headers,
        })
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VbcEndpoint {
    extension: String,
}

impl VbcEndpoint {
    pub fn new(extension: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            extension: require_non_blank("extension", extension)?,
        })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppEndpoint {
    user: String,
}

impl AppEndpoint {
    pub fn new(user: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            user: require_non_blank("user", user)?,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}
