use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use super::VonageError;
use crate::domain::{ApiKey, ApiSecret, ApplicationId, ValidationError};
use crate::transport::{AuthScheme, HttpRequest, RequestBody};

/// Lifetime of generated application JWTs, in seconds.
const JWT_TTL_SECS: i64 = 900;

#[derive(Clone)]
struct Application {
    id: ApplicationId,
    key: EncodingKey,
}

#[derive(Clone, Default)]
/// Credentials the client may authenticate with.
///
/// Key and secret serve the legacy APIs and Basic auth; an application id with
/// its RSA private key (or a pre-issued bearer token) serves JWT auth.
pub struct Credentials {
    key_secret: Option<(ApiKey, ApiSecret)>,
    application: Option<Application>,
    bearer_token: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account API key and secret.
    pub fn key_secret(api_key: ApiKey, api_secret: ApiSecret) -> Self {
        Self::new().with_key_secret(api_key, api_secret)
    }

    pub fn with_key_secret(mut self, api_key: ApiKey, api_secret: ApiSecret) -> Self {
        self.key_secret = Some((api_key, api_secret));
        self
    }

    /// Application id and PEM-encoded RSA private key used to sign RS256 JWTs.
    pub fn with_application(
        mut self,
        application_id: ApplicationId,
        private_key_pem: &[u8],
    ) -> Result<Self, VonageError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem)?;
        self.application = Some(Application {
            id: application_id,
            key,
        });
        Ok(self)
    }

    /// Pre-issued bearer token, sent as is. Takes precedence over signing.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "bearer_token",
            });
        }
        self.bearer_token = Some(token);
        Ok(self)
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.key_secret.as_ref().map(|(key, _)| key)
    }

    pub fn application_id(&self) -> Option<&ApplicationId> {
        self.application.as_ref().map(|app| &app.id)
    }

    pub(crate) fn supports(&self, scheme: AuthScheme) -> bool {
        match scheme {
            AuthScheme::KeySecretQuery | AuthScheme::KeySecretForm | AuthScheme::Basic => {
                self.key_secret.is_some()
            }
            AuthScheme::Jwt => self.bearer_token.is_some() || self.application.is_some(),
        }
    }

    /// First accepted scheme with configured credentials.
    pub(crate) fn select(&self, accepted: &[AuthScheme]) -> Option<AuthScheme> {
        accepted.iter().copied().find(|scheme| self.supports(*scheme))
    }

    /// Attach credentials to `request` using the first scheme it accepts.
    pub(crate) fn apply(&self, request: &mut HttpRequest) -> Result<(), VonageError> {
        let scheme = self
            .select(request.auth)
            .ok_or(VonageError::MissingCredentials {
                family: request.family,
                accepted: request.auth,
            })?;

        match (scheme, self.key_secret.as_ref()) {
            (AuthScheme::KeySecretQuery, Some((key, secret))) => {
                request
                    .url
                    .query_pairs_mut()
                    .append_pair(ApiKey::FIELD, key.as_str())
                    .append_pair(ApiSecret::FIELD, secret.as_str());
            }
            (AuthScheme::KeySecretForm, Some((key, secret))) => {
                let mut params = vec![
                    (ApiKey::FIELD.to_owned(), key.as_str().to_owned()),
                    (ApiSecret::FIELD.to_owned(), secret.as_str().to_owned()),
                ];
                if let RequestBody::Form(existing) = &mut request.body {
                    params.append(existing);
                }
                request.body = RequestBody::Form(params);
            }
            (AuthScheme::Basic, Some((key, secret))) => {
                let encoded = STANDARD.encode(format!("{}:{}", key.as_str(), secret.as_str()));
                request
                    .headers
                    .push(("Authorization", format!("Basic {encoded}")));
            }
            (AuthScheme::Jwt, _) => {
                let token = self.bearer()?;
                request
                    .headers
                    .push(("Authorization", format!("Bearer {token}")));
            }
            _ => {
                return Err(VonageError::MissingCredentials {
                    family: request.family,
                    accepted: request.auth,
                });
            }
        }
        Ok(())
    }

    fn bearer(&self) -> Result<String, VonageError> {
        if let Some(token) = self.bearer_token.as_ref() {
            return Ok(token.clone());
        }
        match self.application.as_ref() {
            Some(app) => generate_jwt(app),
            None => Err(VonageError::Config(
                "JWT auth requires an application id and private key".to_owned(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key())
            .field("application_id", &self.application_id())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    application_id: &'a str,
    iat: i64,
    jti: String,
    exp: i64,
}

fn generate_jwt(app: &Application) -> Result<String, VonageError> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        application_id: app.id.as_str(),
        iat,
        jti: uuid::Uuid::new_v4().to_string(),
        exp: iat + JWT_TTL_SECS,
    };
    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &app.key,
    )?)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::transport::{ApiFamily, HttpMethod};

    const BOTH: &[AuthScheme] = &[AuthScheme::Jwt, AuthScheme::Basic];
    const FORM: &[AuthScheme] = &[AuthScheme::KeySecretForm];
    const QUERY: &[AuthScheme] = &[AuthScheme::KeySecretQuery];

    fn key_secret() -> Credentials {
        Credentials::key_secret(ApiKey::new("abcd1234").unwrap(), ApiSecret::new("s3cr3t").unwrap())
    }

    fn request(auth: &'static [AuthScheme]) -> HttpRequest {
        HttpRequest::new(
            ApiFamily::Messages,
            HttpMethod::Post,
            Url::parse("https://api.nexmo.com/v1/messages").unwrap(),
            auth,
        )
    }

    fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn picks_first_configured_scheme() {
        assert_eq!(key_secret().select(BOTH), Some(AuthScheme::Basic));

        let token = Credentials::new().with_bearer_token("eyJ.token").unwrap();
        assert_eq!(token.select(BOTH), Some(AuthScheme::Jwt));
        assert_eq!(token.select(FORM), None);
    }

    #[test]
    fn basic_header() {
        let mut http = request(BOTH);
        key_secret().apply(&mut http).unwrap();
        assert_eq!(header(&http, "Authorization"), Some("Basic YWJjZDEyMzQ6czNjcjN0"));
    }

    #[test]
    fn bearer_token_header() {
        let mut http = request(BOTH);
        let credentials = key_secret().with_bearer_token("eyJ.token").unwrap();
        credentials.apply(&mut http).unwrap();
        assert_eq!(header(&http, "Authorization"), Some("Bearer eyJ.token"));
    }

    #[test]
    fn key_secret_form_params_come_first() {
        let mut http = request(FORM).form(vec![("to".to_owned(), "447700900000".to_owned())]);
        key_secret().apply(&mut http).unwrap();
        assert_eq!(
            http.body,
            RequestBody::Form(vec![
                ("api_key".to_owned(), "abcd1234".to_owned()),
                ("api_secret".to_owned(), "s3cr3t".to_owned()),
                ("to".to_owned(), "447700900000".to_owned()),
            ])
        );
    }

    #[test]
    fn key_secret_query() {
        let mut http = request(QUERY);
        key_secret().apply(&mut http).unwrap();
        assert_eq!(http.url.query(), Some("api_key=abcd1234&api_secret=s3cr3t"));
    }

    #[test]
    fn missing_credentials_fail_before_io() {
        let mut http = request(FORM);
        let err = Credentials::new().apply(&mut http).unwrap_err();
        assert!(matches!(
            err,
            VonageError::MissingCredentials {
                family: ApiFamily::Messages,
                ..
            }
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let credentials = key_secret().with_bearer_token("eyJ.token").unwrap();
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("eyJ.token"));
    }

    #[test]
    fn rejects_invalid_private_key() {
        let result = Credentials::new()
            .with_application(ApplicationId::new("app-1").unwrap(), b"not a pem");
        assert!(matches!(result, Err(VonageError::Auth(_))));
    }
}
