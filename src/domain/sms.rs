//! Legacy SMS API (`/sms/json`): form-encoded request, per-message status in the body.

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::domain::validation::{ValidationError, check_length, check_range};
use crate::domain::value::{PhoneNumber, SenderId};

/// Maximum `client-ref` length.
pub const SMS_CLIENT_REF_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Encoding of the message body (`type`).
pub enum SmsEncoding {
    #[default]
    Text,
    Unicode,
}

impl SmsEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Unicode => "unicode",
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Optional fields of a legacy SMS send.
pub struct SmsOptions {
    pub encoding: SmsEncoding,
    pub client_ref: Option<String>,
    /// Delivery attempt window in milliseconds.
    pub ttl: Option<u64>,
    pub status_report_req: bool,
    pub callback: Option<Url>,
    pub message_class: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct SendSms {
    from: SenderId,
    to: PhoneNumber,
    text: String,
    options: SmsOptions,
}

impl SendSms {
    pub const TTL_MIN: u64 = 20_000;
    pub const TTL_MAX: u64 = 604_800_000;

    pub fn new(
        from: SenderId,
        to: PhoneNumber,
        text: impl Into<String>,
        options: SmsOptions,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }
        if let Some(client_ref) = options.client_ref.as_deref() {
            check_length("client-ref", client_ref, 1, SMS_CLIENT_REF_MAX)?;
        }
        if let Some(ttl) = options.ttl {
            let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
            check_range("ttl", ttl, Self::TTL_MIN as i64, Self::TTL_MAX as i64)?;
        }
        if let Some(class) = options.message_class {
            check_range("message-class", i64::from(class), 0, 3)?;
        }
        Ok(Self {
            from,
            to,
            text,
            options,
        })
    }

    /// Plain text message with default options.
    pub fn text(
        from: SenderId,
        to: PhoneNumber,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(from, to, text, SmsOptions::default())
    }

    /// Unicode message with default options otherwise.
    pub fn unicode(
        from: SenderId,
        to: PhoneNumber,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            from,
            to,
            text,
            SmsOptions {
                encoding: SmsEncoding::Unicode,
                ..Default::default()
            },
        )
    }

    pub fn from(&self) -> &SenderId {
        &self.from
    }

    pub fn to(&self) -> &PhoneNumber {
        &self.to
    }

    pub fn text_body(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &SmsOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmsResponse {
    pub message_count: u32,
    pub messages: Vec<SmsMessageResult>,
    /// Top-level properties this crate does not model.
    pub extra: BTreeMap<String, Value>,
}

impl SmsResponse {
    /// First message whose status is not success.
    pub fn first_failure(&self) -> Option<&SmsMessageResult> {
        self.messages.iter().find(|m| !m.status.is_success())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmsMessageResult {
    pub to: Option<String>,
    pub message_id: Option<String>,
    pub status: SmsStatusCode,
    pub remaining_balance: Option<String>,
    pub message_price: Option<String>,
    pub network: Option<String>,
    pub client_ref: Option<String>,
    pub error_text: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Per-message status code of the legacy SMS API.
///
/// Preserved as-is even when unknown to this crate.
pub struct SmsStatusCode(i32);

impl SmsStatusCode {
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn as_i32(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    pub fn known_kind(self) -> Option<KnownSmsStatusCode> {
        KnownSmsStatusCode::from_code(self.0)
    }

    /// Returns `true` if the status is transient.
    pub fn is_retryable(self) -> bool {
        matches!(self.known_kind(), Some(kind) if kind.is_retryable())
    }

    pub fn is_auth_error(self) -> bool {
        matches!(
            self.known_kind(),
            Some(KnownSmsStatusCode::InvalidCredentials | KnownSmsStatusCode::InvalidSignature)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KnownSmsStatusCode {
    Success,
    Throttled,
    MissingParameters,
    InvalidParameters,
    InvalidCredentials,
    InternalError,
    InvalidMessage,
    NumberBarred,
    PartnerAccountBarred,
    PartnerQuotaViolation,
    TooManyExistingBinds,
    AccountNotEnabledForHttp,
    MessageTooLong,
    InvalidSignature,
    InvalidSenderAddress,
    InvalidNetworkCode,
    InvalidCallbackUrl,
    NonWhitelistedDestination,
    SignatureAndApiSecretDisallowed,
    NumberDeactivated,
}

impl KnownSmsStatusCode {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Success,
            1 => Self::Throttled,
            2 => Self::MissingParameters,
            3 => Self::InvalidParameters,
            4 => Self::InvalidCredentials,
            5 => Self::InternalError,
            6 => Self::InvalidMessage,
            7 => Self::NumberBarred,
            8 => Self::PartnerAccountBarred,
            9 => Self::PartnerQuotaViolation,
            10 => Self::TooManyExistingBinds,
            11 => Self::AccountNotEnabledForHttp,
            12 => Self::MessageTooLong,
            14 => Self::InvalidSignature,
            15 => Self::InvalidSenderAddress,
            22 => Self::InvalidNetworkCode,
            23 => Self::InvalidCallbackUrl,
            29 => Self::NonWhitelistedDestination,
            32 => Self::SignatureAndApiSecretDisallowed,
            33 => Self::NumberDeactivated,
            _ => return None,
        })
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Throttled | Self::InternalError)
    }
}
