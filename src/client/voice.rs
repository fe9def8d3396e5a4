use std::path::Path;

use url::Url;

use super::{VonageClient, VonageError};
use crate::domain::voice::{
    CallInfo, CallModification, CallResponse, CallsEmbedded, CallsFilter, CreateCall, ModifyCall,
    Ncco,
};
use crate::domain::{CallId, HalPage};
use crate::transport;

#[derive(Debug, Clone, Copy)]
/// Voice API: outbound calls, call control and recordings.
pub struct VoiceApi<'a> {
    client: &'a VonageClient,
}

impl<'a> VoiceApi<'a> {
    pub(super) fn new(client: &'a VonageClient) -> Self {
        Self { client }
    }

    /// Place an outbound call.
    pub async fn create_call(&self, call: &CreateCall) -> Result<CallResponse, VonageError> {
        let http = transport::voice::create_call_request(self.client.base(), call)?;
        self.client
            .json(http, transport::voice::decode_call_response)
            .await
    }

    pub async fn get_call(&self, call: &CallId) -> Result<CallInfo, VonageError> {
        let http = transport::voice::get_call_request(self.client.base(), call)?;
        self.client.json(http, transport::voice::decode_call_info).await
    }

    /// Calls matching `filter`, or `None` when the response has no `calls`
    /// collection.
    pub async fn list_calls(
        &self,
        filter: &CallsFilter,
    ) -> Result<Option<Vec<CallInfo>>, VonageError> {
        let page = self.list_calls_page(filter).await?;
        Ok(page.embedded.and_then(|embedded| embedded.calls))
    }

    /// Full HAL page of `list_calls`, including counts and links.
    pub async fn list_calls_page(
        &self,
        filter: &CallsFilter,
    ) -> Result<HalPage<CallsEmbedded>, VonageError> {
        let http = transport::voice::list_calls_request(self.client.base(), filter)?;
        self.client.json(http, transport::voice::decode_calls_page).await
    }

    /// Modify an in-progress call. Succeeds with `204 No Content`.
    pub async fn modify_call(&self, modification: &CallModification) -> Result<(), VonageError> {
        let http = transport::voice::modify_call_request(self.client.base(), modification)?;
        self.client.empty(http).await
    }

    pub async fn hangup(&self, call: &CallId) -> Result<(), VonageError> {
        self.modify(call, ModifyCall::Hangup).await
    }

    pub async fn mute(&self, call: &CallId) -> Result<(), VonageError> {
        self.modify(call, ModifyCall::Mute).await
    }

    pub async fn unmute(&self, call: &CallId) -> Result<(), VonageError> {
        self.modify(call, ModifyCall::Unmute).await
    }

    pub async fn earmuff(&self, call: &CallId) -> Result<(), VonageError> {
        self.modify(call, ModifyCall::Earmuff).await
    }

    pub async fn unearmuff(&self, call: &CallId) -> Result<(), VonageError> {
        self.modify(call, ModifyCall::Unearmuff).await
    }

    /// Replace the call flow with `ncco`.
    pub async fn transfer_ncco(&self, call: &CallId, ncco: Ncco) -> Result<(), VonageError> {
        self.modify(call, ModifyCall::TransferNcco(ncco)).await
    }

    /// Replace the call flow with the NCCO served at `answer_url`.
    pub async fn transfer_url(&self, call: &CallId, answer_url: Url) -> Result<(), VonageError> {
        self.modify(call, ModifyCall::TransferUrl(answer_url)).await
    }

    async fn modify(&self, call: &CallId, action: ModifyCall) -> Result<(), VonageError> {
        let modification = CallModification::new(call.clone(), action)?;
        self.modify_call(&modification).await
    }

    /// Download a recording from the absolute URL delivered by the recording webhook.
    pub async fn download_recording(&self, recording_url: &Url) -> Result<Vec<u8>, VonageError> {
        let http = transport::voice::download_recording_request(recording_url);
        self.client.bytes(http).await
    }

    /// Download a recording and write it to `path`.
    pub async fn save_recording(
        &self,
        recording_url: &Url,
        path: impl AsRef<Path>,
    ) -> Result<(), VonageError> {
        let bytes = self.download_recording(recording_url).await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}
