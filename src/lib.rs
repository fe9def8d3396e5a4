//! Typed Rust client for the Vonage communications REST APIs.
//!
//! The crate is split in three layers: a domain layer of validated types, a
//! transport layer for wire formats and authentication quirks, and a small
//! client layer orchestrating requests. Each API family is reached through a
//! façade borrowed from [`VonageClient`].
//!
//! ```rust,no_run
//! use vonage::{ApiKey, ApiSecret, Credentials, SendMessage, VonageClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vonage::VonageError> {
//!     let credentials = Credentials::key_secret(ApiKey::new("abcd1234")?, ApiSecret::new("...")?);
//!     let client = VonageClient::new(credentials)?;
//!     let message = SendMessage::sms_text("Acme", "447700900000", "Your order has shipped")?;
//!     let response = client.messages().send(&message).await?;
//!     println!("accepted as {}", response.message_uuid);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    ApiError, ConversationApi, Credentials, MessagesApi, ProactiveConnectApi, SmsApi,
    SubaccountsApi, VerifyApi, VoiceApi, VonageClient, VonageClientBuilder, VonageError,
};
pub use domain::messages::{MessageResponse, SendMessage};
pub use domain::sms::SendSms;
pub use domain::voice::Ncco;
pub use domain::{
    ApiKey, ApiSecret, ApplicationId, CallId, ConversationId, CursorFilter, HalLinks, HalPage,
    PageFilter, PhoneNumber, ProblemDetails, SenderId, SortOrder, ValidationError,
};
pub use transport::{ApiFamily, AuthScheme, TransportError};
