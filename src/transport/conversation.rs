use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    ApiFamily, AuthScheme, BaseUris, HttpMethod, HttpRequest, Query, TransportError, decode_json,
    endpoint, format_instant,
};
use crate::domain::conversation::{
    Conversation, ConversationEvent, ConversationEventsFilter, ConversationProperties,
    ConversationRequest, ConversationState, ConversationsEmbedded, ConversationsFilter,
    CreateEvent, CreateMember, EventsEmbedded, LeaveReason, Member, MemberChannel, MemberMedia,
    MemberState, MemberUserRef, MembersEmbedded, UpdateMember, User, UserConversationsFilter,
    UserProperties, UserRequest, UsersEmbedded, UsersFilter,
};
use crate::domain::{ConversationId, CursorFilter, HalPage, MemberId, UserId};

const AUTH: &[AuthScheme] = &[AuthScheme::Jwt];

#[derive(Debug, Serialize)]
struct ConversationWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a ConversationProperties>,
}

#[derive(Debug, Serialize)]
struct UserWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a UserProperties>,
}

#[derive(Debug, Serialize)]
struct MemberUserWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateMemberWire<'a> {
    state: MemberState,
    user: MemberUserWire<'a>,
    channel: &'a MemberChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    knocking_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    member_id_inviting: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<&'a MemberMedia>,
}

#[derive(Debug, Serialize)]
struct UpdateMemberWire<'a> {
    state: MemberState,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a LeaveReason>,
}

#[derive(Debug, Serialize)]
struct CreateEventWire<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    from: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a Map<String, Value>>,
}

fn v1(base: &BaseUris, segments: &[&str]) -> Result<url::Url, TransportError> {
    let mut path = vec!["v1"];
    path.extend_from_slice(segments);
    endpoint(&base.api, &path)
}

fn request(method: HttpMethod, url: url::Url) -> HttpRequest {
    HttpRequest::new(ApiFamily::Conversation, method, url, AUTH)
}

fn cursor_query(cursor: &CursorFilter) -> Query {
    Query::new()
        .opt("page_size", cursor.page_size())
        .opt("order", cursor.order().map(|order| order.as_str()))
        .opt("cursor", cursor.cursor())
}

fn state_param(state: ConversationState) -> &'static str {
    match state {
        ConversationState::Active => "ACTIVE",
        ConversationState::Inactive => "INACTIVE",
        ConversationState::Deleted => "DELETED",
    }
}

// Conversations

pub(crate) fn list_conversations_request(
    base: &BaseUris,
    filter: &ConversationsFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = v1(base, &["conversations"])?;
    cursor_query(filter.cursor())
        .opt("date_start", filter.date_start().map(format_instant))
        .opt("date_end", filter.date_end().map(format_instant))
        .apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

fn conversation_wire(body: &ConversationRequest) -> ConversationWire<'_> {
    let options = body.options();
    ConversationWire {
        name: options.name.as_deref(),
        display_name: options.display_name.as_deref(),
        image_url: options.image_url.as_ref().map(|url| url.as_str()),
        properties: options.properties.as_ref(),
    }
}

pub(crate) fn create_conversation_request(
    base: &BaseUris,
    body: &ConversationRequest,
) -> Result<HttpRequest, TransportError> {
    request(HttpMethod::Post, v1(base, &["conversations"])?).json(&conversation_wire(body))
}

pub(crate) fn get_conversation_request(
    base: &BaseUris,
    conversation: &ConversationId,
) -> Result<HttpRequest, TransportError> {
    let url = v1(base, &["conversations", conversation.as_str()])?;
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn update_conversation_request(
    base: &BaseUris,
    conversation: &ConversationId,
    body: &ConversationRequest,
) -> Result<HttpRequest, TransportError> {
    let url = v1(base, &["conversations", conversation.as_str()])?;
    request(HttpMethod::Put, url).json(&conversation_wire(body))
}

pub(crate) fn delete_conversation_request(
    base: &BaseUris,
    conversation: &ConversationId,
) -> Result<HttpRequest, TransportError> {
    let url = v1(base, &["conversations", conversation.as_str()])?;
    Ok(request(HttpMethod::Delete, url))
}

// Users

pub(crate) fn list_users_request(
    base: &BaseUris,
    filter: &UsersFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = v1(base, &["users"])?;
    cursor_query(filter.cursor())
        .opt("name", filter.name())
        .apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

fn user_wire(body: &UserRequest) -> UserWire<'_> {
    let options = body.options();
    UserWire {
        name: options.name.as_deref(),
        display_name: options.display_name.as_deref(),
        image_url: options.image_url.as_ref().map(|url| url.as_str()),
        properties: options.properties.as_ref(),
    }
}

pub(crate) fn create_user_request(
    base: &BaseUris,
    body: &UserRequest,
) -> Result<HttpRequest, TransportError> {
    request(HttpMethod::Post, v1(base, &["users"])?).json(&user_wire(body))
}

pub(crate) fn get_user_request(base: &BaseUris, user: &UserId) -> Result<HttpRequest, TransportError> {
    Ok(request(HttpMethod::Get, v1(base, &["users", user.as_str()])?))
}

pub(crate) fn update_user_request(
    base: &BaseUris,
    user: &UserId,
    body: &UserRequest,
) -> Result<HttpRequest, TransportError> {
    request(HttpMethod::Patch, v1(base, &["users", user.as_str()])?).json(&user_wire(body))
}

pub(crate) fn delete_user_request(
    base: &BaseUris,
    user: &UserId,
) -> Result<HttpRequest, TransportError> {
    Ok(request(HttpMethod::Delete, v1(base, &["users", user.as_str()])?))
}

pub(crate) fn list_user_conversations_request(
    base: &BaseUris,
    user: &UserId,
    filter: &UserConversationsFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = v1(base, &["users", user.as_str(), "conversations"])?;
    cursor_query(filter.cursor())
        .opt("state", filter.state().map(state_param))
        .opt("include_custom_data", filter.include_custom_data())
        .opt("date_start", filter.date_start().map(format_instant))
        .opt("date_end", filter.date_end().map(format_instant))
        .apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

// Members

pub(crate) fn list_members_request(
    base: &BaseUris,
    conversation: &ConversationId,
    cursor: &CursorFilter,
) -> Result<HttpRequest, TransportError> {
    let mut url = v1(base, &["conversations", conversation.as_str(), "members"])?;
    cursor_query(cursor).apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn create_member_request(
    base: &BaseUris,
    conversation: &ConversationId,
    member: &CreateMember,
) -> Result<HttpRequest, TransportError> {
    let options = member.options();
    let user = match member.user() {
        MemberUserRef::Id(id) => MemberUserWire {
            id: Some(id.as_str()),
            name: None,
        },
        MemberUserRef::Name(name) => MemberUserWire {
            id: None,
            name: Some(name),
        },
    };
    let wire = CreateMemberWire {
        state: member.state(),
        user,
        channel: member.channel(),
        knocking_id: options.knocking_id.as_deref(),
        member_id_inviting: options.member_id_inviting.as_ref().map(MemberId::as_str),
        from: options.from.as_deref(),
        media: options.media.as_ref(),
    };
    let url = v1(base, &["conversations", conversation.as_str(), "members"])?;
    request(HttpMethod::Post, url).json(&wire)
}

pub(crate) fn get_member_request(
    base: &BaseUris,
    conversation: &ConversationId,
    member: &MemberId,
) -> Result<HttpRequest, TransportError> {
    let url = v1(
        base,
        &["conversations", conversation.as_str(), "members", member.as_str()],
    )?;
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn update_member_request(
    base: &BaseUris,
    conversation: &ConversationId,
    member: &MemberId,
    update: &UpdateMember,
) -> Result<HttpRequest, TransportError> {
    let wire = UpdateMemberWire {
        state: update.state(),
        from: update.from().map(MemberId::as_str),
        reason: update.reason(),
    };
    let url = v1(
        base,
        &["conversations", conversation.as_str(), "members", member.as_str()],
    )?;
    request(HttpMethod::Patch, url).json(&wire)
}

// Events

pub(crate) fn list_events_request(
    base: &BaseUris,
    conversation: &ConversationId,
    filter: &ConversationEventsFilter,
) -> Result<HttpRequest, TransportError> {
    let options = filter.options();
    let mut url = v1(base, &["conversations", conversation.as_str(), "events"])?;
    cursor_query(filter.cursor())
        .opt("start_id", options.start_id)
        .opt("end_id", options.end_id)
        .opt("event_type", options.event_type.as_deref())
        .opt("exclude_deleted_events", options.exclude_deleted_events)
        .apply(&mut url);
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn create_event_request(
    base: &BaseUris,
    conversation: &ConversationId,
    event: &CreateEvent,
) -> Result<HttpRequest, TransportError> {
    let wire = CreateEventWire {
        kind: event.kind(),
        from: event.from().as_str(),
        body: event.body(),
    };
    let url = v1(base, &["conversations", conversation.as_str(), "events"])?;
    request(HttpMethod::Post, url).json(&wire)
}

pub(crate) fn get_event_request(
    base: &BaseUris,
    conversation: &ConversationId,
    event_id: u64,
) -> Result<HttpRequest, TransportError> {
    let id = event_id.to_string();
    let url = v1(base, &["conversations", conversation.as_str(), "events", &id])?;
    Ok(request(HttpMethod::Get, url))
}

pub(crate) fn delete_event_request(
    base: &BaseUris,
    conversation: &ConversationId,
    event_id: u64,
) -> Result<HttpRequest, TransportError> {
    let id = event_id.to_string();
    let url = v1(base, &["conversations", conversation.as_str(), "events", &id])?;
    Ok(request(HttpMethod::Delete, url))
}

pub(crate) fn decode_conversation(body: &[u8]) -> Result<Conversation, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_conversations_page(
    body: &[u8],
) -> Result<HalPage<ConversationsEmbedded>, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_user(body: &[u8]) -> Result<User, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_users_page(body: &[u8]) -> Result<HalPage<UsersEmbedded>, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_member(body: &[u8]) -> Result<Member, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_members_page(body: &[u8]) -> Result<HalPage<MembersEmbedded>, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_event(body: &[u8]) -> Result<ConversationEvent, TransportError> {
    decode_json(body)
}

pub(crate) fn decode_events_page(body: &[u8]) -> Result<HalPage<EventsEmbedded>, TransportError> {
    decode_json(body)
}
