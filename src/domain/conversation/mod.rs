//! Conversation API: conversations, users, members and events.

mod conversations;
mod event;
mod member;
mod user;

pub use conversations::{
    CONVERSATION_DISPLAY_NAME_MAX, CONVERSATION_NAME_MAX, Conversation, ConversationOptions,
    ConversationProperties, ConversationRequest, ConversationState, ConversationTimestamp,
    ConversationsEmbedded, ConversationsFilter,
};
pub use event::{
    ConversationEvent, ConversationEventType, ConversationEventsFilter, CreateEvent,
    EventEmbedded, EventsEmbedded, EventsFilterOptions,
};
pub use member::{
    AudioSettings, ChannelEndpoint, ChannelType, CreateMember, CreateMemberOptions, LeaveReason,
    Member, MemberChannel, MemberEmbedded, MemberMedia, MemberState, MemberTimestamp, MemberUser,
    MemberUserRef, MembersEmbedded, UpdateMember,
};
pub use user::{
    USER_DISPLAY_NAME_MAX, USER_NAME_MAX, User, UserConversationsFilter, UserOptions,
    UserProperties, UserRequest, UsersEmbedded, UsersFilter,
};
