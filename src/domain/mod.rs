//! Domain layer: strong types with validation and invariants (no I/O).
//!
//! Shared value types live at this level, one submodule per API family.

pub(crate) mod lenient;
mod pagination;
mod problem;
mod validation;
mod value;

pub mod conversation;
pub mod messages;
pub mod proactive_connect;
pub mod sms;
pub mod subaccounts;
pub mod verify;
pub mod voice;

pub use pagination::{CursorFilter, HalLink, HalLinks, HalPage, PageFilter, PageLimits};
pub use problem::{InvalidParameter, ProblemDetails};
pub use validation::ValidationError;
pub use value::{
    ApiKey, ApiSecret, ApplicationId, CallId, ConversationId, ItemId, ListId, MemberId,
    PhoneNumber, SenderId, SortOrder, UserId, VerifyRequestId,
};

