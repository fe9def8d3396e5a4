use super::{VonageClient, VonageError};
use crate::domain::sms::{SendSms, SmsResponse};
use crate::transport::{self, ApiFamily};

#[derive(Debug, Clone, Copy)]
/// Legacy SMS API (`rest.nexmo.com/sms/json`).
pub struct SmsApi<'a> {
    client: &'a VonageClient,
}

impl<'a> SmsApi<'a> {
    pub(super) fn new(client: &'a VonageClient) -> Self {
        Self { client }
    }

    /// Send an SMS.
    ///
    /// Errors:
    /// - [`VonageError::LegacyApi`] when any message part reports a non-zero
    ///   status (the first failing part is reported),
    /// - [`VonageError::Api`] for non-2xx HTTP responses.
    pub async fn send(&self, request: &SendSms) -> Result<SmsResponse, VonageError> {
        let response = self.send_raw(request).await?;
        if let Some(failed) = response.first_failure() {
            return Err(VonageError::LegacyApi {
                family: ApiFamily::Sms,
                status: failed.status.as_i32(),
                error_text: failed.error_text.clone(),
            });
        }
        Ok(response)
    }

    /// Send an SMS and return every per-part status without checking them.
    pub async fn send_raw(&self, request: &SendSms) -> Result<SmsResponse, VonageError> {
        let http = transport::sms::send_sms_request(self.client.base(), request)?;
        self.client
            .json(http, transport::sms::decode_send_sms_json_response)
            .await
    }
}
