use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use super::conversations::ConversationState;
use crate::domain::pagination::{CursorFilter, HalLinks};
use crate::domain::validation::{ValidationError, check_length};

pub const USER_NAME_MAX: usize = 200;
pub const USER_DISPLAY_NAME_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<UserProperties>,
    /// Per-channel contact points, kept as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Map<String, Value>>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HalLinks>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsersEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserOptions {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub image_url: Option<Url>,
    pub properties: Option<UserProperties>,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Body of user create and update requests.
pub struct UserRequest {
    options: UserOptions,
}

impl UserRequest {
    pub fn new(options: UserOptions) -> Result<Self, ValidationError> {
        if let Some(name) = options.name.as_deref() {
            check_length("name", name, 1, USER_NAME_MAX)?;
        }
        if let Some(display_name) = options.display_name.as_deref() {
            check_length("display_name", display_name, 1, USER_DISPLAY_NAME_MAX)?;
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &UserOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsersFilter {
    cursor: CursorFilter,
    name: Option<String>,
}

impl UsersFilter {
    pub fn new(cursor: CursorFilter, name: Option<String>) -> Self {
        Self { cursor, name }
    }

    pub fn cursor(&self) -> &CursorFilter {
        &self.cursor
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Query filter of the conversations a user belongs to.
pub struct UserConversationsFilter {
    cursor: CursorFilter,
    state: Option<ConversationState>,
    include_custom_data: Option<bool>,
    date_start: Option<DateTime<Utc>>,
    date_end: Option<DateTime<Utc>>,
}

impl UserConversationsFilter {
    pub fn new(
        cursor: CursorFilter,
        state: Option<ConversationState>,
        include_custom_data: Option<bool>,
        date_start: Option<DateTime<Utc>>,
        date_end: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if matches!((date_start, date_end), (Some(start), Some(end)) if end < start) {
            return Err(ValidationError::Invalid {
                field: "date_end",
                reason: "must not precede date_start",
            });
        }
        Ok(Self {
            cursor,
            state,
            include_custom_data,
            date_start,
            date_end,
        })
    }

    pub fn cursor(&self) -> &CursorFilter {
        &self.cursor
    }

    pub fn state(&self) -> Option<ConversationState> {
        self.state
    }

    pub fn include_custom_data(&self) -> Option<bool> {
        self.include_custom_data
    }

    pub fn date_start(&self) -> Option<DateTime<Utc>> {
        self.date_start
    }

    pub fn date_end(&self) -> Option<DateTime<Utc>> {
        self.date_end
    }
}
