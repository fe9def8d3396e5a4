use std::fmt;

/// Local validation failure raised by a constructor before any request is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was missing or blank.
    Empty { field: &'static str },
    /// A string field had a length outside its allowed bounds.
    LengthOutOfRange {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
    /// A collection held more entries than allowed.
    TooMany {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// An integer field was outside its allowed bounds.
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        actual: i64,
    },
    /// A decimal field was outside its allowed bounds.
    DecimalOutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        actual: f64,
    },
    InvalidPhoneNumber { input: String },
    /// Two fields that cannot be set together were both set.
    Conflict {
        field: &'static str,
        other: &'static str,
    },
    /// A field was set without the field it depends on.
    Requires {
        field: &'static str,
        requires: &'static str,
    },
    /// The channel does not support the message type.
    UnsupportedMessageType {
        channel: &'static str,
        message_type: &'static str,
    },
    /// A field had the right shape but a disallowed value.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::LengthOutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(
                f,
                "{field} length out of range: {actual} (expected {min}..={max})"
            ),
            Self::TooMany { field, max, actual } => {
                write!(f, "too many {field}: {actual} (max {max})")
            }
            Self::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "{field} out of range: {actual} (expected {min}..={max})"),
            Self::DecimalOutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "{field} out of range: {actual} (expected {min}..={max})"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::Conflict { field, other } => {
                write!(f, "{field} cannot be combined with {other}")
            }
            Self::Requires { field, requires } => write!(f, "{field} requires {requires}"),
            Self::UnsupportedMessageType {
                channel,
                message_type,
            } => write!(
                f,
                "message type {message_type} is not supported on channel {channel}"
            ),
            Self::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub(crate) fn require_non_blank(
    field: &'static str,
    value: impl Into<String>,
) -> Result<String, ValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual == 0 && min > 0 {
        return Err(ValidationError::Empty { field });
    }
    if !(min..=max).contains(&actual) {
        return Err(ValidationError::LengthOutOfRange {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            actual: value,
        });
    }
    Ok(())
}

pub(crate) fn check_decimal_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::DecimalOutOfRange {
            field,
            min,
            max,
            actual: value,
        });
    }
    Ok(())
}

pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::Invalid {
            field,
            reason: "must be a positive number",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty { field: "to" };
        assert_eq!(err.to_string(), "to must not be empty");

        let err = ValidationError::TooMany {
            field: "tags",
            max: 10,
            actual: 11,
        };
        assert_eq!(err.to_string(), "too many tags: 11 (max 10)");

        let err = ValidationError::InvalidPhoneNumber {
            input: "bad".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid phone number: bad");

        let err = ValidationError::OutOfRange {
            field: "limit",
            min: 1,
            max: 7200,
            actual: 7201,
        };
        assert_eq!(
            err.to_string(),
            "limit out of range: 7201 (expected 1..=7200)"
        );

        let err = ValidationError::UnsupportedMessageType {
            channel: "sms",
            message_type: "image",
        };
        assert_eq!(
            err.to_string(),
            "message type image is not supported on channel sms"
        );

        let err = ValidationError::Conflict {
            field: "domain",
            other: "uri",
        };
        assert_eq!(err.to_string(), "domain cannot be combined with uri");
    }

    #[test]
    fn length_check_reports_empty_before_range() {
        assert_eq!(
            check_length("name", "", 1, 10),
            Err(ValidationError::Empty { field: "name" })
        );
        assert!(check_length("name", "abc", 1, 3).is_ok());
        assert!(matches!(
            check_length("name", "abcd", 1, 3),
            Err(ValidationError::LengthOutOfRange { actual: 4, .. })
        ));
    }

    #[test]
    fn decimal_range_is_inclusive() {
        assert!(check_decimal_range("endOnSilence", 0.4, 0.4, 10.0).is_ok());
        assert!(check_decimal_range("endOnSilence", 10.0, 0.4, 10.0).is_ok());
        assert!(check_decimal_range("endOnSilence", 0.3, 0.4, 10.0).is_err());
        assert!(check_positive("amount", 0.0).is_err());
        assert!(check_positive("amount", f64::NAN).is_err());
        assert!(check_positive("amount", 0.01).is_ok());
    }
}
