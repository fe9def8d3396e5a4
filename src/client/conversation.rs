use super::{VonageClient, VonageError};
use crate::domain::conversation::{
    Conversation, ConversationEvent, ConversationEventsFilter, ConversationRequest,
    ConversationsEmbedded, ConversationsFilter, CreateEvent, CreateMember, EventsEmbedded, Member,
    MembersEmbedded, UpdateMember, User, UserConversationsFilter, UserRequest, UsersEmbedded,
    UsersFilter,
};
use crate::domain::{ConversationId, CursorFilter, HalPage, MemberId, UserId};
use crate::transport;

#[derive(Debug, Clone, Copy)]
/// Conversation API: conversations, users, members and events.
///
/// Listings are cursor-paginated. The plain `list_*` methods return the
/// embedded collection (or `None` when the response omits it); the `*_page`
/// variants return the whole HAL page so the caller can follow
/// [`HalLinks::next_cursor`](crate::domain::HalLinks::next_cursor).
pub struct ConversationApi<'a> {
    client: &'a VonageClient,
}

impl<'a> ConversationApi<'a> {
    pub(super) fn new(client: &'a VonageClient) -> Self {
        Self { client }
    }

    // Conversations

    pub async fn list_conversations(
        &self,
        filter: &ConversationsFilter,
    ) -> Result<Option<Vec<Conversation>>, VonageError> {
        let page = self.list_conversations_page(filter).await?;
        Ok(page.embedded.and_then(|embedded| embedded.conversations))
    }

    pub async fn list_conversations_page(
        &self,
        filter: &ConversationsFilter,
    ) -> Result<HalPage<ConversationsEmbedded>, VonageError> {
        let http = transport::conversation::list_conversations_request(self.client.base(), filter)?;
        self.client
            .json(http, transport::conversation::decode_conversations_page)
            .await
    }

    pub async fn create_conversation(
        &self,
        request: &ConversationRequest,
    ) -> Result<Conversation, VonageError> {
        let http =
            transport::conversation::create_conversation_request(self.client.base(), request)?;
        self.client
            .json(http, transport::conversation::decode_conversation)
            .await
    }

    pub async fn get_conversation(
        &self,
        conversation: &ConversationId,
    ) -> Result<Conversation, VonageError> {
        let http =
            transport::conversation::get_conversation_request(self.client.base(), conversation)?;
        self.client
            .json(http, transport::conversation::decode_conversation)
            .await
    }

    pub async fn update_conversation(
        &self,
        conversation: &ConversationId,
        request: &ConversationRequest,
    ) -> Result<Conversation, VonageError> {
        let http = transport::conversation::update_conversation_request(
            self.client.base(),
            conversation,
            request,
        )?;
        self.client
            .json(http, transport::conversation::decode_conversation)
            .await
    }

    pub async fn delete_conversation(
        &self,
        conversation: &ConversationId,
    ) -> Result<(), VonageError> {
        let http =
            transport::conversation::delete_conversation_request(self.client.base(), conversation)?;
        self.client.empty(http).await
    }

    // Users

    pub async fn list_users(&self, filter: &UsersFilter) -> Result<Option<Vec<User>>, VonageError> {
        let page = self.list_users_page(filter).await?;
        Ok(page.embedded.and_then(|embedded| embedded.users))
    }

    pub async fn list_users_page(
        &self,
        filter: &UsersFilter,
    ) -> Result<HalPage<UsersEmbedded>, VonageError> {
        let http = transport::conversation::list_users_request(self.client.base(), filter)?;
        self.client
            .json(http, transport::conversation::decode_users_page)
            .await
    }

    pub async fn create_user(&self, request: &UserRequest) -> Result<User, VonageError> {
        let http = transport::conversation::create_user_request(self.client.base(), request)?;
        self.client
            .json(http, transport::conversation::decode_user)
            .await
    }

    pub async fn get_user(&self, user: &UserId) -> Result<User, VonageError> {
        let http = transport::conversation::get_user_request(self.client.base(), user)?;
        self.client
            .json(http, transport::conversation::decode_user)
            .await
    }

    pub async fn update_user(
        &self,
        user: &UserId,
        request: &UserRequest,
    ) -> Result<User, VonageError> {
        let http =
            transport::conversation::update_user_request(self.client.base(), user, request)?;
        self.client
            .json(http, transport::conversation::decode_user)
            .await
    }

    pub async fn delete_user(&self, user: &UserId) -> Result<(), VonageError> {
        let http = transport::conversation::delete_user_request(self.client.base(), user)?;
        self.client.empty(http).await
    }

    /// Conversations the user is a member of.
    pub async fn list_user_conversations(
        &self,
        user: &UserId,
        filter: &UserConversationsFilter,
    ) -> Result<Option<Vec<Conversation>>, VonageError> {
        let page = self.list_user_conversations_page(user, filter).await?;
        Ok(page.embedded.and_then(|embedded| embedded.conversations))
    }

    pub async fn list_user_conversations_page(
        &self,
        user: &UserId,
        filter: &UserConversationsFilter,
    ) -> Result<HalPage<ConversationsEmbedded>, VonageError> {
        let http = transport::conversation::list_user_conversations_request(
            self.client.base(),
            user,
            filter,
        )?;
        self.client
            .json(http, transport::conversation::decode_conversations_page)
            .await
    }

    // Members

    pub async fn list_members(
        &self,
        conversation: &ConversationId,
        cursor: &CursorFilter,
    ) -> Result<Option<Vec<Member>>, VonageError> {
        let page = self.list_members_page(conversation, cursor).await?;
        Ok(page.embedded.and_then(|embedded| embedded.members))
    }

    pub async fn list_members_page(
        &self,
        conversation: &ConversationId,
        cursor: &CursorFilter,
    ) -> Result<HalPage<MembersEmbedded>, VonageError> {
        let http =
            transport::conversation::list_members_request(self.client.base(), conversation, cursor)?;
        self.client
            .json(http, transport::conversation::decode_members_page)
            .await
    }

    pub async fn create_member(
        &self,
        conversation: &ConversationId,
        member: &CreateMember,
    ) -> Result<Member, VonageError> {
        let http =
            transport::conversation::create_member_request(self.client.base(), conversation, member)?;
        self.client
            .json(http, transport::conversation::decode_member)
            .await
    }

    pub async fn get_member(
        &self,
        conversation: &ConversationId,
        member: &MemberId,
    ) -> Result<Member, VonageError> {
        let http =
            transport::conversation::get_member_request(self.client.base(), conversation, member)?;
        self.client
            .json(http, transport::conversation::decode_member)
            .await
    }

    pub async fn update_member(
        &self,
        conversation: &ConversationId,
        member: &MemberId,
        update: &UpdateMember,
    ) -> Result<Member, VonageError> {
        let http = transport::conversation::update_member_request(
            self.client.base(),
            conversation,
            member,
            update,
        )?;
        self.client
            .json(http, transport::conversation::decode_member)
            .await
    }

    // Events

    pub async fn list_events(
        &self,
        conversation: &ConversationId,
        filter: &ConversationEventsFilter,
    ) -> Result<Option<Vec<ConversationEvent>>, VonageError> {
        let page = self.list_events_page(conversation, filter).await?;
        Ok(page.embedded.and_then(|embedded| embedded.events))
    }

    pub async fn list_events_page(
        &self,
        conversation: &ConversationId,
        filter: &ConversationEventsFilter,
    ) -> Result<HalPage<EventsEmbedded>, VonageError> {
        let http =
            transport::conversation::list_events_request(self.client.base(), conversation, filter)?;
        self.client
            .json(http, transport::conversation::decode_events_page)
            .await
    }

    pub async fn create_event(
        &self,
        conversation: &ConversationId,
        event: &CreateEvent,
    ) -> Result<ConversationEvent, VonageError> {
        let http =
            transport::conversation::create_event_request(self.client.base(), conversation, event)?;
        self.client
            .json(http, transport::conversation::decode_event)
            .await
    }

    pub async fn get_event(
        &self,
        conversation: &ConversationId,
        event_id: u64,
    ) -> Result<ConversationEvent, VonageError> {
        let http =
            transport::conversation::get_event_request(self.client.base(), conversation, event_id)?;
        self.client
            .json(http, transport::conversation::decode_event)
            .await
    }

    pub async fn delete_event(
        &self,
        conversation: &ConversationId,
        event_id: u64,
    ) -> Result<(), VonageError> {
        let http = transport::conversation::delete_event_request(
            self.client.base(),
            conversation,
            event_id,
        )?;
        self.client.empty(http).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::Credentials;
    use super::super::fake::{FakeTransport, make_client};
    use super::*;
    use crate::domain::conversation::MemberState;
    use crate::domain::SortOrder;
    use crate::transport::{ApiFamily, HttpMethod};

    fn credentials() -> Credentials {
        Credentials::new().with_bearer_token("eyJ.token").unwrap()
    }

    fn conversation() -> ConversationId {
        ConversationId::new("CON-d66d47de-5bcb-4300-94f0-0c9d4b948e9a").unwrap()
    }

    #[tokio::test]
    async fn list_conversations_follows_cursor() {
        let json = r#"{
            "page_size": 10,
            "_embedded": {"conversations": [
                {"id": "CON-d66d47de-5bcb-4300-94f0-0c9d4b948e9a", "name": "customer_chat"}
            ]},
            "_links": {
                "first": {"href": "https://api.nexmo.com/v1/conversations?order=desc&page_size=10"},
                "self": {"href": "https://api.nexmo.com/v1/conversations?order=desc&page_size=10&cursor=7EjDNQrAcipmOnc0HCzpQRkhBULzY44ljGUX%2FlzKOm2TNr%2BgmvgwVcMpL3sjBxAS"},
                "next": {"href": "https://api.nexmo.com/v1/conversations?order=desc&page_size=10&cursor=abc123"}
            }
        }"#;
        let transport = FakeTransport::new(200, json);
        let client = make_client(credentials(), transport.clone());
        let filter = ConversationsFilter::new(
            CursorFilter::new(Some(10), Some(SortOrder::Desc), None).unwrap(),
            None,
            None,
        )
        .unwrap();

        let page = client
            .conversation()
            .list_conversations_page(&filter)
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().url.as_str(),
            "https://api.nexmo.com/v1/conversations?page_size=10&order=desc"
        );
        let conversations = page.embedded.and_then(|e| e.conversations).unwrap();
        assert_eq!(conversations[0].name.as_deref(), Some("customer_chat"));

        let next = page
            .links
            .and_then(|links| CursorFilter::next_of(&links, Some(10)))
            .unwrap()
            .unwrap();
        assert_eq!(next.cursor(), Some("abc123"));
    }

    #[tokio::test]
    async fn list_users_without_embedded_is_none() {
        let client = make_client(
            credentials(),
            FakeTransport::new(200, r#"{"page_size":10,"_links":{}}"#),
        );
        let users = client
            .conversation()
            .list_users(&UsersFilter::default())
            .await
            .unwrap();
        assert_eq!(users, None);
    }

    #[tokio::test]
    async fn leave_member_patches_state() {
        let transport = FakeTransport::new(
            200,
            r#"{"id":"MEM-1","conversation_id":"CON-d66d47de-5bcb-4300-94f0-0c9d4b948e9a","state":"LEFT"}"#,
        );
        let client = make_client(credentials(), transport.clone());

        let member = client
            .conversation()
            .update_member(
                &conversation(),
                &MemberId::new("MEM-1").unwrap(),
                &UpdateMember::leave(),
            )
            .await
            .unwrap();
        assert_eq!(member.state, Some(MemberState::Left));

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(
            request.url.as_str(),
            "https://api.nexmo.com/v1/conversations/CON-d66d47de-5bcb-4300-94f0-0c9d4b948e9a/members/MEM-1"
        );
        assert_eq!(transport.json_body(), json!({"state": "LEFT"}));
    }

    #[tokio::test]
    async fn custom_event_is_posted() {
        let transport = FakeTransport::new(
            201,
            r#"{"id":42,"type":"custom:order_shipped","from":"MEM-1","timestamp":"2020-01-01T14:00:00.00Z"}"#,
        );
        let client = make_client(credentials(), transport.clone());
        let mut body = serde_json::Map::new();
        body.insert("order".to_owned(), json!("A-1"));
        let event = CreateEvent::custom("order_shipped", MemberId::new("MEM-1").unwrap(), Some(body))
            .unwrap();

        let created = client
            .conversation()
            .create_event(&conversation(), &event)
            .await
            .unwrap();
        assert_eq!(created.id, Some(42));
        assert_eq!(created.custom_name(), Some("order_shipped"));
        assert_eq!(
            transport.json_body(),
            json!({"type": "custom:order_shipped", "from": "MEM-1", "body": {"order": "A-1"}})
        );
    }

    #[tokio::test]
    async fn delete_event_maps_not_found() {
        let client = make_client(
            credentials(),
            FakeTransport::new(
                404,
                r#"{"title":"Event not found.","type":"https://developer.nexmo.com/api-errors/conversation#event-not-found","code":"conversation:error:not-found"}"#,
            ),
        );
        let err = client
            .conversation()
            .delete_event(&conversation(), 7)
            .await
            .unwrap_err();
        match err {
            VonageError::Api(api) => {
                assert_eq!(api.family, ApiFamily::Conversation);
                assert_eq!(api.status, 404);
                assert_eq!(api.title(), Some("Event not found."));
                assert!(api.problem.extra.contains_key("code"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
