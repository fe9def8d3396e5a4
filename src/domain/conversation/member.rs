use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::lenient;
use crate::domain::pagination::HalLinks;
use crate::domain::validation::{ValidationError, require_non_blank};
use crate::domain::value::{MemberId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberState {
    Invited,
    Joined,
    Left,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ChannelType {
    App,
    Phone,
    Sms,
    Mms,
    Whatsapp,
    Viber,
    Messenger,
    Sip,
    Websocket,
    Vbc,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// One side of a member channel (`from` or `to`).
pub struct ChannelEndpoint {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberChannel {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<ChannelEndpoint>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberTimestamp {
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub invited: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub joined: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub left: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earmuffed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_settings: Option<AudioSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<MemberUser>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<MemberState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<MemberTimestamp>,
    /// Who caused the member to join, kept as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<MemberChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MemberMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knocking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<MemberEmbedded>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HalLinks>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MembersEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
/// User a new member refers to, by id or by name.
pub enum MemberUserRef {
    Id(UserId),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateMemberOptions {
    pub knocking_id: Option<String>,
    pub member_id_inviting: Option<MemberId>,
    pub from: Option<String>,
    pub media: Option<MemberMedia>,
}

#[derive(Debug, Clone, PartialEq)]
/// Add a user to a conversation. `state` must be `INVITED` or `JOINED`.
pub struct CreateMember {
    state: MemberState,
    user: MemberUserRef,
    channel: MemberChannel,
    options: CreateMemberOptions,
}

impl CreateMember {
    pub fn new(
        state: MemberState,
        user: MemberUserRef,
        channel: MemberChannel,
        options: CreateMemberOptions,
    ) -> Result<Self, ValidationError> {
        if !matches!(state, MemberState::Invited | MemberState::Joined) {
            return Err(ValidationError::Invalid {
                field: "state",
                reason: "must be INVITED or JOINED",
            });
        }
        if let MemberUserRef::Name(name) = &user {
            require_non_blank("user.name", name.as_str())?;
        }
        if channel.kind.is_none() {
            return Err(ValidationError::Empty {
                field: "channel.type",
            });
        }
        Ok(Self {
            state,
            user,
            channel,
            options,
        })
    }

    pub fn state(&self) -> MemberState {
        self.state
    }

    pub fn user(&self) -> &MemberUserRef {
        &self.user
    }

    pub fn channel(&self) -> &MemberChannel {
        &self.channel
    }

    pub fn options(&self) -> &CreateMemberOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaveReason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Member state change (`PATCH`). Only `JOINED` and `LEFT` are accepted.
pub struct UpdateMember {
    state: MemberState,
    from: Option<MemberId>,
    reason: Option<LeaveReason>,
}

impl UpdateMember {
    pub fn new(
        state: MemberState,
        from: Option<MemberId>,
        reason: Option<LeaveReason>,
    ) -> Result<Self, ValidationError> {
        if !matches!(state, MemberState::Joined | MemberState::Left) {
            return Err(ValidationError::Invalid {
                field: "state",
                reason: "must be JOINED or LEFT",
            });
        }
        if reason.is_some() && state != MemberState::Left {
            return Err(ValidationError::Requires {
                field: "reason",
                requires: "state LEFT",
            });
        }
        Ok(Self {
            state,
            from,
            reason,
        })
    }

    pub fn leave() -> Self {
        Self {
            state: MemberState::Left,
            from: None,
            reason: None,
        }
    }

    pub fn state(&self) -> MemberState {
        self.state
    }

    pub fn from(&self) -> Option<&MemberId> {
        self.from.as_ref()
    }

    pub fn reason(&self) -> Option<&LeaveReason> {
        self.reason.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_channel() -> MemberChannel {
        MemberChannel {
            kind: Some(ChannelType::App),
            ..Default::default()
        }
    }

    #[test]
    fn create_member_state_rules() {
        let user = || MemberUserRef::Name("alice".to_owned());
        assert!(
            CreateMember::new(MemberState::Left, user(), app_channel(), Default::default()).is_err()
        );
        assert!(
            CreateMember::new(MemberState::Invited, user(), app_channel(), Default::default()).is_ok()
        );
        assert!(
            CreateMember::new(
                MemberState::Joined,
                user(),
                MemberChannel::default(),
                Default::default()
            )
            .is_err()
        );
    }

    #[test]
    fn update_member_reason_requires_left() {
        let reason = LeaveReason {
            code: Some("123".to_owned()),
            text: Some("bye".to_owned()),
        };
        assert!(UpdateMember::new(MemberState::Joined, None, Some(reason.clone())).is_err());
        assert!(UpdateMember::new(MemberState::Left, None, Some(reason)).is_ok());
        assert!(UpdateMember::new(MemberState::Invited, None, None).is_err());
        assert_eq!(UpdateMember::leave().state(), MemberState::Left);
    }

    #[test]
    fn member_decodes_nested_objects() {
        let json = r#"{
            "id": "MEM-63f61863-4a51-4f6b-86e1-46edebio0391",
            "state": "JOINED",
            "_embedded": {"user": {"id": "USR-1", "name": "alice"}},
            "timestamp": {"joined": "2020-01-01T14:00:00.00Z"},
            "channel": {"type": "app", "from": {"type": "phone", "number": "447700900000"}, "leg_ids": ["a"]},
            "media": {"audio_settings": {"enabled": true, "muted": false}},
            "initiator": {"joined": {"is_system": true}}
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert_eq!(member.state, Some(MemberState::Joined));
        let channel = member.channel.unwrap();
        assert_eq!(channel.kind, Some(ChannelType::App));
        assert_eq!(
            channel.from.and_then(|f| f.number).as_deref(),
            Some("447700900000")
        );
        assert!(channel.extra.contains_key("leg_ids"));
        assert_eq!(
            member.embedded.and_then(|e| e.user).and_then(|u| u.name).as_deref(),
            Some("alice")
        );
    }
}
