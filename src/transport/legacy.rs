//! Shared decoding for the legacy SMS and Verify JSON bodies.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, Visitor};

/// `status`, price and counter fields of the legacy APIs.
///
/// Vonage documents these as strings (`"status": "0"`, `"message-price":
/// "0.03330000"`) but some responses send bare numbers. Strings are kept
/// verbatim; numbers are rendered with their shortest decimal form.
///
/// The visitor only relies on primitive `visit_*` calls, so the type also
/// decodes inside structs that capture unknown properties with
/// `#[serde(flatten)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LegacyScalar(String);

impl LegacyScalar {
    pub(crate) fn into_string(self) -> String {
        self.0
    }

    /// Integer value of the token, as used by status codes and counters.
    pub(crate) fn as_i32(&self) -> Option<i32> {
        self.0.trim().parse().ok()
    }
}

struct LegacyScalarVisitor;

impl Visitor<'_> for LegacyScalarVisitor {
    type Value = LegacyScalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON string or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(LegacyScalar(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(LegacyScalar(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(LegacyScalar(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(LegacyScalar(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(LegacyScalar(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for LegacyScalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(LegacyScalarVisitor)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::Value;

    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        value: LegacyScalar,
        #[serde(flatten)]
        extra: BTreeMap<String, Value>,
    }

    #[test]
    fn strings_are_kept_verbatim() {
        let holder: Holder = serde_json::from_str(r#"{"value": "10.00"}"#).unwrap();
        assert_eq!(holder.value.into_string(), "10.00");

        let holder: Holder = serde_json::from_str(r#"{"value": "0"}"#).unwrap();
        assert_eq!(holder.value.as_i32(), Some(0));
    }

    #[test]
    fn numbers_decode_next_to_flattened_extra() {
        let holder: Holder =
            serde_json::from_str(r#"{"value": 101, "hint": "retry"}"#).unwrap();
        assert_eq!(holder.value.as_i32(), Some(101));
        assert_eq!(holder.extra.get("hint"), Some(&Value::from("retry")));

        let holder: Holder = serde_json::from_str(r#"{"value": 0.0333}"#).unwrap();
        assert_eq!(holder.value.into_string(), "0.0333");
    }

    #[test]
    fn other_json_types_are_rejected() {
        assert!(serde_json::from_str::<Holder>(r#"{"value": true}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"value": null}"#).is_err());
    }
}
