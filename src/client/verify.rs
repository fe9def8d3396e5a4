use super::{VonageClient, VonageError};
use crate::domain::VerifyRequestId;
use crate::domain::verify::{
    Psd2Request, VerifyCheck, VerifyCheckResponse, VerifyControlCommand, VerifyControlResponse,
    VerifyRequest, VerifyResponse, VerifySearchResponse, VerifyStatusCode,
};
use crate::transport::{self, ApiFamily};

#[derive(Debug, Clone, Copy)]
/// Legacy Verify API.
///
/// Every operation answers `200 OK`; failures are reported through a non-zero
/// `status` in the body and surface as [`VonageError::LegacyApi`].
pub struct VerifyApi<'a> {
    client: &'a VonageClient,
}

impl<'a> VerifyApi<'a> {
    pub(super) fn new(client: &'a VonageClient) -> Self {
        Self { client }
    }

    /// Start a verification and return its request id.
    pub async fn request(&self, request: &VerifyRequest) -> Result<VerifyResponse, VonageError> {
        let http = transport::verify::verify_request(self.client.base(), request)?;
        let response = self
            .client
            .json(http, transport::verify::decode_verify_response)
            .await?;
        ensure_success(response.status, response.error_text.as_deref())?;
        Ok(response)
    }

    /// Start a PSD2 (payment) verification.
    pub async fn psd2(&self, request: &Psd2Request) -> Result<VerifyResponse, VonageError> {
        let http = transport::verify::psd2_request(self.client.base(), request)?;
        let response = self
            .client
            .json(http, transport::verify::decode_verify_response)
            .await?;
        ensure_success(response.status, response.error_text.as_deref())?;
        Ok(response)
    }

    /// Check the code the user entered.
    pub async fn check(&self, check: &VerifyCheck) -> Result<VerifyCheckResponse, VonageError> {
        let http = transport::verify::check_request(self.client.base(), check)?;
        let response = self
            .client
            .json(http, transport::verify::decode_check_response)
            .await?;
        ensure_success(response.status, response.error_text.as_deref())?;
        Ok(response)
    }

    pub async fn search(
        &self,
        request_id: &VerifyRequestId,
    ) -> Result<VerifySearchResponse, VonageError> {
        let http = transport::verify::search_request(self.client.base(), request_id)?;
        let response = self
            .client
            .json(http, transport::verify::decode_search_response)
            .await?;
        if let Some(status) = response.error_status() {
            ensure_success(status, response.error_text.as_deref())?;
        }
        Ok(response)
    }

    pub async fn cancel(
        &self,
        request_id: &VerifyRequestId,
    ) -> Result<VerifyControlResponse, VonageError> {
        self.control(request_id, VerifyControlCommand::Cancel).await
    }

    /// Skip to the next delivery attempt of the workflow.
    pub async fn trigger_next_event(
        &self,
        request_id: &VerifyRequestId,
    ) -> Result<VerifyControlResponse, VonageError> {
        self.control(request_id, VerifyControlCommand::TriggerNextEvent)
            .await
    }

    async fn control(
        &self,
        request_id: &VerifyRequestId,
        command: VerifyControlCommand,
    ) -> Result<VerifyControlResponse, VonageError> {
        let http = transport::verify::control_request(self.client.base(), request_id, command)?;
        let response = self
            .client
            .json(http, transport::verify::decode_control_response)
            .await?;
        ensure_success(response.status, response.error_text.as_deref())?;
        Ok(response)
    }
}

fn ensure_success(status: VerifyStatusCode, error_text: Option<&str>) -> Result<(), VonageError> {
    if status.is_success() {
        return Ok(());
    }
    Err(VonageError::LegacyApi {
        family: ApiFamily::Verify,
        status: status.as_i32(),
        error_text: error_text.map(str::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use super::super::Credentials;
    use super::super::fake::{FakeTransport, make_client};
    use super::*;
    use crate::domain::verify::VerifyOptions;
    use crate::domain::{ApiKey, ApiSecret, PhoneNumber};

    fn credentials() -> Credentials {
        Credentials::key_secret(ApiKey::new("abcd1234").unwrap(), ApiSecret::new("s3cr3t").unwrap())
    }

    fn request_id() -> VerifyRequestId {
        VerifyRequestId::new("abcdef0123456789abcdef0123456789").unwrap()
    }

    #[tokio::test]
    async fn request_returns_id() {
        let transport = FakeTransport::new(
            200,
            r#"{"request_id":"abcdef0123456789abcdef0123456789","status":"0"}"#,
        );
        let client = make_client(credentials(), transport.clone());
        let request = VerifyRequest::new(
            PhoneNumber::new("447700900000").unwrap(),
            "Acme Inc",
            None,
            VerifyOptions::default(),
        )
        .unwrap();

        let response = client.verify().request(&request).await.unwrap();
        assert_eq!(
            response.request_id.as_deref(),
            Some("abcdef0123456789abcdef0123456789")
        );
        assert_eq!(transport.form_param("api_key").as_deref(), Some("abcd1234"));
        assert_eq!(transport.form_param("brand").as_deref(), Some("Acme Inc"));
    }

    #[tokio::test]
    async fn non_zero_status_is_legacy_error() {
        let client = make_client(
            credentials(),
            FakeTransport::new(
                200,
                r#"{"request_id":"","status":"10","error_text":"Concurrent verifications to the same number are not allowed"}"#,
            ),
        );
        let request = VerifyRequest::new(
            PhoneNumber::new("447700900000").unwrap(),
            "Acme Inc",
            None,
            VerifyOptions::default(),
        )
        .unwrap();

        let err = client.verify().request(&request).await.unwrap_err();
        match err {
            VonageError::LegacyApi {
                family,
                status,
                error_text,
            } => {
                assert_eq!(family, ApiFamily::Verify);
                assert_eq!(status, 10);
                assert!(error_text.unwrap().starts_with("Concurrent"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_sends_credentials_in_query() {
        let transport = FakeTransport::new(
            200,
            r#"{"request_id":"abcdef0123456789abcdef0123456789","status":"IN PROGRESS"}"#,
        );
        let client = make_client(credentials(), transport.clone());

        let response = client.verify().search(&request_id()).await.unwrap();
        assert_eq!(response.status.as_deref(), Some("IN PROGRESS"));
        assert_eq!(
            transport.last_request().url.query(),
            Some("request_id=abcdef0123456789abcdef0123456789&api_key=abcd1234&api_secret=s3cr3t")
        );
    }

    #[tokio::test]
    async fn cancel_posts_control_command() {
        let transport = FakeTransport::new(200, r#"{"status":"0","command":"cancel"}"#);
        let client = make_client(credentials(), transport.clone());

        let response = client.verify().cancel(&request_id()).await.unwrap();
        assert_eq!(response.command.as_deref(), Some("cancel"));
        assert_eq!(transport.form_param("cmd").as_deref(), Some("cancel"));
    }

    #[tokio::test]
    async fn check_failure_is_reported() {
        let client = make_client(
            credentials(),
            FakeTransport::new(
                200,
                r#"{"request_id":"abc","status":"16","error_text":"The code provided does not match the expected value"}"#,
            ),
        );
        let check = VerifyCheck::new(request_id(), "1234", None).unwrap();
        let err = client.verify().check(&check).await.unwrap_err();
        assert!(matches!(err, VonageError::LegacyApi { status: 16, .. }));
    }
}
