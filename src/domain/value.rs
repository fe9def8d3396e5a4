use std::fmt;

use phonenumber::country;
use serde::{Deserialize, Serialize};

use crate::domain::validation::{ValidationError, require_non_blank};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Field name used on the wire.
            pub const FIELD: &'static str = $field;

            /// Create a validated identifier (non-empty after trimming).
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                Ok(Self(require_non_blank(Self::FIELD, value)?))
            }

            /// Borrow the identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Vonage account API key. Also identifies subaccounts.
    ApiKey,
    "api_key"
);
identifier!(
    /// Vonage application id used as the JWT `application_id` claim.
    ApplicationId,
    "application_id"
);
identifier!(
    /// Voice call UUID.
    CallId,
    "uuid"
);
identifier!(ConversationId, "conversation_id");
identifier!(UserId, "user_id");
identifier!(MemberId, "member_id");
identifier!(
    /// Proactive Connect list id.
    ListId,
    "list_id"
);
identifier!(
    /// Proactive Connect list item id.
    ItemId,
    "item_id"
);
identifier!(
    /// Legacy Verify request id.
    VerifyRequestId,
    "request_id"
);

#[derive(Clone, PartialEq, Eq, Hash)]
/// Vonage account API secret.
///
/// Invariant: must not be empty. The value is never printed by `Debug`.
pub struct ApiSecret(String);

impl ApiSecret {
    /// Field name used on the wire (`api_secret`).
    pub const FIELD: &'static str = "api_secret";

    /// Create a validated [`ApiSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the secret as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Phone number in the digits-only international form Vonage expects.
///
/// Invariant: after trimming, dropping one leading `+` and removing cosmetic
/// characters (spaces, dashes, dots, parentheses) the value is all ASCII digits
/// with a length of `7..=15`.
pub struct PhoneNumber {
    raw: String,
    number: String,
}

impl PhoneNumber {
    /// Field name used on the wire (`to`).
    pub const FIELD: &'static str = "to";

    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    const COSMETIC: [char; 5] = [' ', '-', '.', '(', ')'];

    /// Sanitize and validate a phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let raw = value.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let without_plus = raw.strip_prefix('+').unwrap_or(&raw);
        let number: String = without_plus
            .chars()
            .filter(|c| !Self::COSMETIC.contains(c))
            .collect();

        let valid = number.chars().all(|c| c.is_ascii_digit())
            && (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&number.len());
        if !valid {
            return Err(ValidationError::InvalidPhoneNumber { input: raw });
        }

        Ok(Self { raw, number })
    }

    /// Parse a nationally formatted number using `default_region`, normalizing to E.164.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;
        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        let mut number = Self::new(e164)?;
        number.raw = raw;
        Ok(number)
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Sanitized digits as sent to Vonage.
    pub fn as_str(&self) -> &str {
        &self.number
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.number)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender of an SMS or MMS: a phone number or an alphanumeric sender id.
///
/// Invariant: either a valid [`PhoneNumber`], or `1..=11` ASCII letters, digits
/// and spaces.
pub struct SenderId(String);

impl SenderId {
    /// Field name used on the wire (`from`).
    pub const FIELD: &'static str = "from";

    /// Maximum length of an alphanumeric sender id.
    pub const MAX_ALPHANUMERIC: usize = 11;

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = require_non_blank(Self::FIELD, value)?;
        if let Ok(number) = PhoneNumber::new(value.as_str()) {
            return Ok(Self(number.number));
        }

        let alphanumeric = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ');
        if !alphanumeric || value.chars().count() > Self::MAX_ALPHANUMERIC {
            return Err(ValidationError::Invalid {
                field: Self::FIELD,
                reason: "expected a phone number or up to 11 alphanumeric characters",
            });
        }
        Ok(Self(value))
    }

    /// Borrow the sender as sent to Vonage.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for SenderId {
    fn from(value: PhoneNumber) -> Self {
        Self(value.number)
    }
}

impl Serialize for SenderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Sort order accepted by list endpoints.
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_trim_and_reject_blank() {
        let key = ApiKey::new("  abcd1234 ").unwrap();
        assert_eq!(key.as_str(), "abcd1234");
        assert_eq!(key.to_string(), "abcd1234");
        assert!(ApiKey::new("   ").is_err());

        let list = ListId::new("29192c4a-4058-49da-86c2-3e349d1065b7").unwrap();
        assert_eq!(list.as_str(), "29192c4a-4058-49da-86c2-3e349d1065b7");
        assert!(matches!(
            ConversationId::new(""),
            Err(ValidationError::Empty {
                field: ConversationId::FIELD
            })
        ));
    }

    #[test]
    fn api_secret_is_redacted_in_debug() {
        let secret = ApiSecret::new(" s3cret ").unwrap();
        assert_eq!(secret.as_str(), " s3cret ");
        assert_eq!(format!("{secret:?}"), "ApiSecret(***)");
        assert!(ApiSecret::new("").is_err());
    }

    #[test]
    fn phone_number_strips_cosmetic_characters() {
        let number = PhoneNumber::new(" +44 (7900) 000-009 ").unwrap();
        assert_eq!(number.as_str(), "447900000009");
        assert_eq!(number.raw(), "+44 (7900) 000-009");

        let number = PhoneNumber::new("1-200-200-9000").unwrap();
        assert_eq!(number.as_str(), "12002009000");
    }

    #[test]
    fn phone_number_rejects_bad_input() {
        assert!(matches!(
            PhoneNumber::new("  "),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            PhoneNumber::new("44790000000x"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
        assert!(PhoneNumber::new("123456").is_err());
        assert!(PhoneNumber::new("1234567").is_ok());
        assert!(PhoneNumber::new("123456789012345").is_ok());
        assert!(PhoneNumber::new("1234567890123456").is_err());
        assert!(PhoneNumber::new("++447900000009").is_err());
    }

    #[test]
    fn phone_number_parse_uses_region() {
        let number = PhoneNumber::parse(Some(country::Id::GB), "07900 000009").unwrap();
        assert_eq!(number.as_str(), "447900000009");
        assert_eq!(number.raw(), "07900 000009");
        assert!(PhoneNumber::parse(None, "not-a-number").is_err());
    }

    #[test]
    fn phone_number_serializes_sanitized() {
        let number = PhoneNumber::new("+1 200 200 9000").unwrap();
        assert_eq!(serde_json::to_string(&number).unwrap(), "\"12002009000\"");
    }

    #[test]
    fn sender_id_accepts_numbers_and_short_alphanumerics() {
        assert_eq!(SenderId::new("+44 7900 000009").unwrap().as_str(), "447900000009");
        assert_eq!(SenderId::new("Vonage").unwrap().as_str(), "Vonage");
        assert!(SenderId::new("Vonage APIs1").is_err());
        assert!(SenderId::new("Vonage!").is_err());
        assert!(SenderId::new("").is_err());
    }
}
