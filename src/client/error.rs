use std::error::Error as StdError;
use std::fmt;

use crate::domain::{ProblemDetails, ValidationError};
use crate::transport::{ApiFamily, AuthScheme, TransportError};

#[derive(Debug, Clone, PartialEq)]
/// Non-success HTTP response of a JSON API.
///
/// `status` is always present; `problem` is best-effort and defaults to empty
/// when the body is missing or is not a problem document.
pub struct ApiError {
    pub family: ApiFamily,
    pub status: u16,
    pub problem: ProblemDetails,
}

impl ApiError {
    pub fn kind(&self) -> Option<&str> {
        self.problem.kind.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.problem.title.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.problem.detail.as_deref()
    }

    pub fn instance(&self) -> Option<&str> {
        self.problem.instance.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} API returned HTTP {}", self.family, self.status)?;
        match (self.title(), self.detail()) {
            (Some(title), Some(detail)) => write!(f, ": {title} ({detail})"),
            (Some(text), None) | (None, Some(text)) => write!(f, ": {text}"),
            (None, None) => Ok(()),
        }
    }
}

impl StdError for ApiError {}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`VonageClient`](crate::VonageClient).
pub enum VonageError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-2xx HTTP status with the decoded problem detail.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Legacy SMS or Verify API reported a non-zero status inside a 200 body.
    #[error("{family} API status {status}: {}", error_text.as_deref().unwrap_or("no error text"))]
    LegacyApi {
        family: ApiFamily,
        status: i32,
        error_text: Option<String>,
    },

    /// Request could not be encoded or the response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] TransportError),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// None of the authentication schemes the operation accepts is configured.
    #[error("no credentials configured for {family} (accepts {accepted:?})")]
    MissingCredentials {
        family: ApiFamily,
        accepted: &'static [AuthScheme],
    },

    /// Private key could not be loaded or the JWT could not be signed.
    #[error("authentication error: {0}")]
    Auth(#[from] jsonwebtoken::errors::Error),

    /// Client configuration is invalid (for example a malformed base URI).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Writing a download to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VonageError {
    /// HTTP status of an [`VonageError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(api) => Some(api.status),
            _ => None,
        }
    }

    pub fn family(&self) -> Option<ApiFamily> {
        match self {
            Self::Api(api) => Some(api.family),
            Self::LegacyApi { family, .. } | Self::MissingCredentials { family, .. } => {
                Some(*family)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_uses_problem_fields() {
        let err = ApiError {
            family: ApiFamily::Messages,
            status: 422,
            problem: ProblemDetails {
                title: Some("Invalid params".to_owned()),
                detail: Some("The value of `to` is not valid".to_owned()),
                ..Default::default()
            },
        };
        assert_eq!(
            err.to_string(),
            "messages API returned HTTP 422: Invalid params (The value of `to` is not valid)"
        );

        let bare = ApiError {
            family: ApiFamily::Voice,
            status: 500,
            problem: ProblemDetails::default(),
        };
        assert_eq!(bare.to_string(), "voice API returned HTTP 500");
    }

    #[test]
    fn error_accessors() {
        let err = VonageError::LegacyApi {
            family: ApiFamily::Sms,
            status: 2,
            error_text: Some("Missing to param".to_owned()),
        };
        assert_eq!(err.family(), Some(ApiFamily::Sms));
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "sms API status 2: Missing to param");
    }
}
