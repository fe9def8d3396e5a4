//! Legacy Verify API (`/verify/*/json`): form-encoded requests, status in the body.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::validation::{
    ValidationError, check_length, check_positive, check_range, require_non_blank,
};
use crate::domain::value::{PhoneNumber, SenderId, VerifyRequestId};

/// Maximum `brand` and `payee` length.
pub const VERIFY_BRAND_MAX: usize = 18;

#[derive(Debug, Clone, Default)]
/// Options shared by `request` and `psd2`.
pub struct VerifyOptions {
    pub country: Option<String>,
    /// Code length: 4 or 6.
    pub code_length: Option<u8>,
    /// Locale of the message, e.g. `en-gb`.
    pub lg: Option<String>,
    /// Seconds the code stays valid (60..=3600).
    pub pin_expiry: Option<u32>,
    /// Seconds between delivery attempts (60..=900).
    pub next_event_wait: Option<u32>,
    /// Predefined delivery workflow (1..=7).
    pub workflow_id: Option<u8>,
}

impl VerifyOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(country) = self.country.as_deref() {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ValidationError::Invalid {
                    field: "country",
                    reason: "expected a two-letter country code",
                });
            }
        }
        if let Some(length) = self.code_length {
            if length != 4 && length != 6 {
                return Err(ValidationError::Invalid {
                    field: "code_length",
                    reason: "must be 4 or 6",
                });
            }
        }
        if let Some(lg) = self.lg.as_deref() {
            require_non_blank("lg", lg)?;
        }
        if let Some(expiry) = self.pin_expiry {
            check_range("pin_expiry", i64::from(expiry), 60, 3600)?;
        }
        if let Some(wait) = self.next_event_wait {
            check_range("next_event_wait", i64::from(wait), 60, 900)?;
        }
        if let Some(workflow) = self.workflow_id {
            check_range("workflow_id", i64::from(workflow), 1, 7)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Start a verification (`/verify/json`).
pub struct VerifyRequest {
    number: PhoneNumber,
    brand: String,
    sender_id: Option<SenderId>,
    options: VerifyOptions,
}

impl VerifyRequest {
    pub fn new(
        number: PhoneNumber,
        brand: impl Into<String>,
        sender_id: Option<SenderId>,
        options: VerifyOptions,
    ) -> Result<Self, ValidationError> {
        let brand = brand.into();
        check_length("brand", &brand, 1, VERIFY_BRAND_MAX)?;
        options.validate()?;
        Ok(Self {
            number,
            brand,
            sender_id,
            options,
        })
    }

    pub fn number(&self) -> &PhoneNumber {
        &self.number
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn sender_id(&self) -> Option<&SenderId> {
        self.sender_id.as_ref()
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }
}

#[derive(Debug, Clone)]
/// Start a PSD2 payment verification (`/verify/psd2/json`).
pub struct Psd2Request {
    number: PhoneNumber,
    payee: String,
    amount: f64,
    options: VerifyOptions,
}

impl Psd2Request {
    pub fn new(
        number: PhoneNumber,
        payee: impl Into<String>,
        amount: f64,
        options: VerifyOptions,
    ) -> Result<Self, ValidationError> {
        let payee = payee.into();
        check_length("payee", &payee, 1, VERIFY_BRAND_MAX)?;
        check_positive("amount", amount)?;
        options.validate()?;
        Ok(Self {
            number,
            payee,
            amount,
            options,
        })
    }

    pub fn number(&self) -> &PhoneNumber {
        &self.number
    }

    pub fn payee(&self) -> &str {
        &self.payee
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }
}

#[derive(Debug, Clone)]
/// Check a code entered by the user (`/verify/check/json`).
pub struct VerifyCheck {
    request_id: VerifyRequestId,
    code: String,
    ip_address: Option<String>,
}

impl VerifyCheck {
    pub fn new(
        request_id: VerifyRequestId,
        code: impl Into<String>,
        ip_address: Option<String>,
    ) -> Result<Self, ValidationError> {
        let code = code.into();
        check_length("code", &code, 4, 10)?;
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::Invalid {
                field: "code",
                reason: "must contain digits only",
            });
        }
        Ok(Self {
            request_id,
            code,
            ip_address,
        })
    }

    pub fn request_id(&self) -> &VerifyRequestId {
        &self.request_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Command of `/verify/control/json`.
pub enum VerifyControlCommand {
    Cancel,
    TriggerNextEvent,
}

impl VerifyControlCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::TriggerNextEvent => "trigger_next_event",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyResponse {
    pub request_id: Option<String>,
    pub status: VerifyStatusCode,
    pub error_text: Option<String>,
    pub network: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyCheckResponse {
    pub request_id: Option<String>,
    pub event_id: Option<String>,
    pub status: VerifyStatusCode,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub estimated_price_messages_sent: Option<String>,
    pub error_text: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyControlResponse {
    pub status: VerifyStatusCode,
    pub command: Option<String>,
    pub error_text: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Outcome of a verification as reported by `search`.
pub enum VerificationStatus {
    InProgress,
    Success,
    Failed,
    Expired,
    Cancelled,
}

impl VerificationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "IN PROGRESS" => Self::InProgress,
            "SUCCESS" => Self::Success,
            "FAILED" => Self::Failed,
            "EXPIRED" => Self::Expired,
            "CANCELLED" => Self::Cancelled,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyCheckAttempt {
    pub date_received: Option<String>,
    pub code: Option<String>,
    pub status: Option<String>,
    pub ip_address: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyEvent {
    pub kind: Option<String>,
    pub id: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Result of `search`.
///
/// `status` is a verification state (`IN PROGRESS`, `SUCCESS`, ...) on success
/// and a numeric status code on failure.
pub struct VerifySearchResponse {
    pub request_id: Option<String>,
    pub account_id: Option<String>,
    pub number: Option<String>,
    pub sender_id: Option<String>,
    pub date_submitted: Option<String>,
    pub date_finalized: Option<String>,
    pub first_event_date: Option<String>,
    pub last_event_date: Option<String>,
    pub status: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub estimated_price_messages_sent: Option<String>,
    pub error_text: Option<String>,
    pub checks: Vec<VerifyCheckAttempt>,
    pub events: Vec<VerifyEvent>,
    pub extra: BTreeMap<String, Value>,
}

impl VerifySearchResponse {
    pub fn verification_status(&self) -> Option<VerificationStatus> {
        self.status.as_deref().and_then(VerificationStatus::parse)
    }

    /// Status code when the search itself failed.
    pub fn error_status(&self) -> Option<VerifyStatusCode> {
        self.status
            .as_deref()
            .and_then(|status| status.parse::<i32>().ok())
            .map(VerifyStatusCode::new)
            .filter(|code| !code.is_success())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Status code of the legacy Verify API. Preserved even when unknown.
pub struct VerifyStatusCode(i32);

impl VerifyStatusCode {
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn as_i32(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    pub fn known_kind(self) -> Option<KnownVerifyStatusCode> {
        KnownVerifyStatusCode::from_code(self.0)
    }

    pub fn is_retryable(self) -> bool {
        matches!(
            self.known_kind(),
            Some(KnownVerifyStatusCode::Throttled | KnownVerifyStatusCode::InternalError)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KnownVerifyStatusCode {
    Success,
    Throttled,
    MissingParameters,
    InvalidParameters,
    InvalidCredentials,
    InternalError,
    Unroutable,
    NumberBarred,
    PartnerAccountBarred,
    PartnerQuotaViolation,
    ConcurrentVerification,
    UnsupportedNetwork,
    RequestNotFound,
    CodeMismatch,
    WrongCodeTooManyTimes,
    TooManyRequests,
    NonPermittedDestination,
    InvalidCountry,
}

impl KnownVerifyStatusCode {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Success,
            1 => Self::Throttled,
            2 => Self::MissingParameters,
            3 => Self::InvalidParameters,
            4 => Self::InvalidCredentials,
            5 => Self::InternalError,
            6 => Self::Unroutable,
            7 => Self::NumberBarred,
            8 => Self::PartnerAccountBarred,
            9 => Self::PartnerQuotaViolation,
            10 => Self::ConcurrentVerification,
            15 => Self::UnsupportedNetwork,
            101 => Self::RequestNotFound,
            16 => Self::CodeMismatch,
            17 => Self::WrongCodeTooManyTimes,
            19 => Self::TooManyRequests,
            29 => Self::NonPermittedDestination,
            33 => Self::InvalidCountry,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number() -> PhoneNumber {
        PhoneNumber::new("+44 7700 900000").unwrap()
    }

    #[test]
    fn request_validates_brand_and_options() {
        assert!(VerifyRequest::new(number(), "", None, VerifyOptions::default()).is_err());
        assert!(VerifyRequest::new(number(), "x".repeat(19), None, VerifyOptions::default()).is_err());
        assert!(VerifyRequest::new(number(), "x".repeat(18), None, VerifyOptions::default()).is_ok());

        let options = VerifyOptions {
            code_length: Some(5),
            ..Default::default()
        };
        assert!(VerifyRequest::new(number(), "Acme", None, options).is_err());

        let options = VerifyOptions {
            workflow_id: Some(8),
            ..Default::default()
        };
        assert!(VerifyRequest::new(number(), "Acme", None, options).is_err());

        let options = VerifyOptions {
            country: Some("GB".to_owned()),
            code_length: Some(6),
            pin_expiry: Some(3600),
            next_event_wait: Some(60),
            workflow_id: Some(7),
            lg: Some("en-gb".to_owned()),
        };
        assert!(VerifyRequest::new(number(), "Acme", None, options).is_ok());
    }

    #[test]
    fn psd2_requires_positive_amount() {
        assert!(Psd2Request::new(number(), "Acme", 0.0, VerifyOptions::default()).is_err());
        assert!(Psd2Request::new(number(), "Acme", 10.5, VerifyOptions::default()).is_ok());
    }

    #[test]
    fn check_code_must_be_digits() {
        let id = VerifyRequestId::new("abcdef0123456789abcdef0123456789").unwrap();
        assert!(VerifyCheck::new(id.clone(), "123", None).is_err());
        assert!(VerifyCheck::new(id.clone(), "12a4", None).is_err());
        assert!(VerifyCheck::new(id, "1234", None).is_ok());
    }

    #[test]
    fn search_status_interpretation() {
        let mut response = VerifySearchResponse {
            status: Some("IN PROGRESS".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            response.verification_status(),
            Some(VerificationStatus::InProgress)
        );
        assert_eq!(response.error_status(), None);

        response.status = Some("101".to_owned());
        assert_eq!(response.verification_status(), None);
        assert_eq!(
            response.error_status().and_then(VerifyStatusCode::known_kind),
            Some(KnownVerifyStatusCode::RequestNotFound)
        );
    }

    #[test]
    fn status_code_helpers() {
        assert!(VerifyStatusCode::new(0).is_success());
        assert!(VerifyStatusCode::new(1).is_retryable());
        assert_eq!(VerifyStatusCode::new(999).known_kind(), None);
    }
}
