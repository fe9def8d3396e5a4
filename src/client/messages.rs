use super::{VonageClient, VonageError};
use crate::domain::messages::{MessageResponse, SendMessage};
use crate::transport;

#[derive(Debug, Clone, Copy)]
/// Messages API (`POST /v1/messages`).
pub struct MessagesApi<'a> {
    client: &'a VonageClient,
}

impl<'a> MessagesApi<'a> {
    pub(super) fn new(client: &'a VonageClient) -> Self {
        Self { client }
    }

    /// Send a message on any supported channel. Accepted messages return `202`
    /// with the message UUID; delivery is reported through status webhooks.
    pub async fn send(&self, message: &SendMessage) -> Result<MessageResponse, VonageError> {
        let http = transport::messages::send_message_request(self.client.base(), message)?;
        self.client
            .json(http, transport::messages::decode_message_response)
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::Credentials;
    use super::super::fake::{FakeTransport, make_client};
    use super::*;

    #[tokio::test]
    async fn bearer_token_is_preferred_over_basic() {
        let transport = FakeTransport::new(202, r#"{"message_uuid":"m-1"}"#);
        let credentials = Credentials::new().with_bearer_token("eyJ.token").unwrap();
        let client = make_client(credentials, transport.clone());

        let message = SendMessage::sms_text("447900000009", "12002009000", "Hello, World!").unwrap();
        client.messages().send(&message).await.unwrap();

        assert_eq!(transport.header("Authorization").as_deref(), Some("Bearer eyJ.token"));
        assert_eq!(
            transport.header("Content-Type").as_deref(),
            Some("application/json")
        );
        assert_eq!(
            transport.json_body(),
            json!({
                "message_type": "text",
                "channel": "sms",
                "from": "447900000009",
                "to": "12002009000",
                "text": "Hello, World!"
            })
        );
    }
}
