//! Client layer: orchestrates transport calls and maps transport ↔ domain.
//!
//! [`VonageClient`] owns the credentials, base URIs and the HTTP client. Each
//! API family is reached through a borrowed façade (`client.sms()`,
//! `client.voice()`, ...) exposing one method per operation.

mod auth;
mod conversation;
mod error;
mod messages;
mod proactive_connect;
mod sms;
mod subaccounts;
mod verify;
mod voice;

#[cfg(test)]
mod fake;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::domain::{ApiKey, ApiSecret, ApplicationId};
use crate::transport::{
    self, BaseUris, HttpMethod, HttpRequest, RequestBody, TransportError,
};

pub use auth::Credentials;
pub use conversation::ConversationApi;
pub use error::{ApiError, VonageError};
pub use messages::MessagesApi;
pub use proactive_connect::ProactiveConnectApi;
pub use sms::SmsApi;
pub use subaccounts::SubaccountsApi;
pub use verify::VerifyApi;
pub use voice::VoiceApi;

const ENV_API_KEY: &str = "VONAGE_API_KEY";
const ENV_API_SECRET: &str = "VONAGE_API_SECRET";
const ENV_APPLICATION_ID: &str = "VONAGE_APPLICATION_ID";
const ENV_PRIVATE_KEY_PATH: &str = "VONAGE_PRIVATE_KEY_PATH";
const ENV_API_BASE_URL: &str = "VONAGE_API_BASE_URL";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, request.url);
            for (name, value) in request.headers {
                builder = builder.header(name, value);
            }
            builder = match request.body {
                RequestBody::Empty => builder,
                RequestBody::Json(bytes) => builder.body(bytes),
                RequestBody::Form(params) => builder.form(&params),
                RequestBody::Multipart {
                    field,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(content_type)?;
                    builder.multipart(reqwest::multipart::Form::new().part(field, part))
                }
            };

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Builder for [`VonageClient`].
///
/// Use this when you need to customize base URIs, the timeout, or the user-agent.
pub struct VonageClientBuilder {
    credentials: Credentials,
    api_base_uri: String,
    rest_base_uri: String,
    api_eu_base_uri: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl VonageClientBuilder {
    /// Create a builder with the production hosts and no timeout/user-agent override.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api_base_uri: transport::DEFAULT_API_BASE_URI.to_owned(),
            rest_base_uri: transport::DEFAULT_REST_BASE_URI.to_owned(),
            api_eu_base_uri: transport::DEFAULT_API_EU_BASE_URI.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Builder configured from `VONAGE_*` environment variables.
    ///
    /// Key and secret are used when both are set; the application id is used
    /// together with the private key read from `VONAGE_PRIVATE_KEY_PATH`.
    /// `VONAGE_API_BASE_URL` overrides the main API host.
    pub fn from_env() -> Result<Self, VonageError> {
        let mut credentials = Credentials::new();
        if let (Some(key), Some(secret)) = (env_var(ENV_API_KEY), env_var(ENV_API_SECRET)) {
            credentials = credentials.with_key_secret(ApiKey::new(key)?, ApiSecret::new(secret)?);
        }
        if let (Some(application_id), Some(path)) =
            (env_var(ENV_APPLICATION_ID), env_var(ENV_PRIVATE_KEY_PATH))
        {
            let pem = std::fs::read(&path)?;
            credentials = credentials.with_application(ApplicationId::new(application_id)?, &pem)?;
        }

        let mut builder = Self::new(credentials);
        if let Some(base) = env_var(ENV_API_BASE_URL) {
            builder = builder.api_base_uri(base);
        }
        Ok(builder)
    }

    /// Override the main API host (`https://api.nexmo.com`).
    pub fn api_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.api_base_uri = uri.into();
        self
    }

    /// Override the legacy REST host used by SMS (`https://rest.nexmo.com`).
    pub fn rest_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.rest_base_uri = uri.into();
        self
    }

    /// Override the EU host used by Proactive Connect (`https://api-eu.vonage.com`).
    pub fn api_eu_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.api_eu_base_uri = uri.into();
        self
    }

    /// Point every API family at the same host. Mostly useful against a mock server.
    pub fn base_uri(self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.api_base_uri(uri.clone())
            .rest_base_uri(uri.clone())
            .api_eu_base_uri(uri)
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`VonageClient`].
    pub fn build(self) -> Result<VonageClient, VonageError> {
        let base = BaseUris {
            api: parse_base_uri(&self.api_base_uri)?,
            rest: parse_base_uri(&self.rest_base_uri)?,
            api_eu: parse_base_uri(&self.api_eu_base_uri)?,
        };

        let mut builder = reqwest::Client::builder().user_agent(
            self.user_agent
                .unwrap_or_else(|| format!("vonage-rust/{}", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| VonageError::Transport(Box::new(err)))?;

        Ok(VonageClient {
            credentials: self.credentials,
            base,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parse_base_uri(uri: &str) -> Result<Url, VonageError> {
    let url = Url::parse(uri).map_err(|err| VonageError::Config(format!("{uri}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(VonageError::Config(
            TransportError::InvalidBaseUri(uri.to_owned()).to_string(),
        ));
    }
    Ok(url)
}

#[derive(Clone)]
/// High-level Vonage client.
///
/// Cloning is cheap: clones share the underlying HTTP connection pool.
pub struct VonageClient {
    credentials: Credentials,
    base: BaseUris,
    http: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for VonageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VonageClient")
            .field("credentials", &self.credentials)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl VonageClient {
    /// Create a client against the production hosts.
    ///
    /// For more customization, use [`VonageClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, VonageError> {
        VonageClientBuilder::new(credentials).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> VonageClientBuilder {
        VonageClientBuilder::new(credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Legacy SMS API.
    pub fn sms(&self) -> SmsApi<'_> {
        SmsApi::new(self)
    }

    /// Messages API (SMS, MMS, WhatsApp, Messenger, Viber).
    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi::new(self)
    }

    /// Voice API: calls and recordings.
    pub fn voice(&self) -> VoiceApi<'_> {
        VoiceApi::new(self)
    }

    /// Legacy Verify API.
    pub fn verify(&self) -> VerifyApi<'_> {
        VerifyApi::new(self)
    }

    pub fn subaccounts(&self) -> SubaccountsApi<'_> {
        SubaccountsApi::new(self)
    }

    pub fn proactive_connect(&self) -> ProactiveConnectApi<'_> {
        ProactiveConnectApi::new(self)
    }

    pub fn conversation(&self) -> ConversationApi<'_> {
        ConversationApi::new(self)
    }

    fn base(&self) -> &BaseUris {
        &self.base
    }

    /// Authorize and send `request`. Non-2xx statuses become [`VonageError::Api`].
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, VonageError> {
        let family = request.family;
        tracing::debug!(
            %family,
            method = request.method.as_str(),
            url = %request.url,
            "sending request"
        );
        self.credentials.apply(&mut request)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(VonageError::Transport)?;
        tracing::debug!(%family, status = response.status, "received response");

        if !(200..=299).contains(&response.status) {
            let problem = transport::decode_problem(&response.body);
            tracing::warn!(
                %family,
                status = response.status,
                title = problem.title.as_deref().unwrap_or_default(),
                "request failed"
            );
            return Err(ApiError {
                family,
                status: response.status,
                problem,
            }
            .into());
        }
        Ok(response)
    }

    async fn json<T>(
        &self,
        request: HttpRequest,
        decode: fn(&[u8]) -> Result<T, TransportError>,
    ) -> Result<T, VonageError> {
        let response = self.send(request).await?;
        Ok(decode(&response.body)?)
    }

    async fn empty(&self, request: HttpRequest) -> Result<(), VonageError> {
        self.send(request).await.map(|_| ())
    }

    async fn bytes(&self, request: HttpRequest) -> Result<Vec<u8>, VonageError> {
        Ok(self.send(request).await?.body)
    }
}
