use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::endpoint::{Endpoint, PhoneEndpoint};
use super::ncco::{AdvancedMachineDetection, EventMethod, MachineDetection, Ncco};
use crate::domain::lenient;
use crate::domain::pagination::HalLinks;
use crate::domain::validation::{ValidationError, check_range};
use crate::domain::value::{CallId, SortOrder};

#[derive(Debug, Clone, PartialEq)]
/// How Vonage obtains the call flow: inline NCCO or an answer webhook.
pub enum CallInstructions {
    Ncco(Ncco),
    AnswerUrl {
        url: Url,
        method: Option<EventMethod>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateCallOptions {
    pub from: Option<PhoneEndpoint>,
    pub random_from_number: Option<bool>,
    pub event_url: Option<Url>,
    pub event_method: Option<EventMethod>,
    pub machine_detection: Option<MachineDetection>,
    pub advanced_machine_detection: Option<AdvancedMachineDetection>,
    /// Maximum call length in seconds.
    pub length_timer: Option<u32>,
    /// Seconds to ring before giving up.
    pub ringing_timer: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
/// Outbound call request (`POST /v1/calls`).
pub struct CreateCall {
    to: Endpoint,
    instructions: CallInstructions,
    options: CreateCallOptions,
}

impl CreateCall {
    pub const LENGTH_TIMER_MAX: u32 = 7200;
    pub const RINGING_TIMER_MAX: u32 = 120;

    /// Either `from` or `random_from_number = true` must be given, not both.
    pub fn new(
        to: impl Into<Endpoint>,
        instructions: CallInstructions,
        options: CreateCallOptions,
    ) -> Result<Self, ValidationError> {
        let random = options.random_from_number == Some(true);
        match (&options.from, random) {
            (Some(_), true) => {
                return Err(ValidationError::Conflict {
                    field: "random_from_number",
                    other: "from",
                });
            }
            (None, false) => return Err(ValidationError::Empty { field: "from" }),
            _ => {}
        }
        if let CallInstructions::Ncco(ncco) = &instructions {
            if ncco.is_empty() {
                return Err(ValidationError::Empty { field: "ncco" });
            }
        }
        if let Some(length) = options.length_timer {
            check_range("length_timer", i64::from(length), 1, i64::from(Self::LENGTH_TIMER_MAX))?;
        }
        if let Some(ringing) = options.ringing_timer {
            check_range(
                "ringing_timer",
                i64::from(ringing),
                1,
                i64::from(Self::RINGING_TIMER_MAX),
            )?;
        }
        if options.machine_detection.is_some() && options.advanced_machine_detection.is_some() {
            return Err(ValidationError::Conflict {
                field: "advanced_machine_detection",
                other: "machine_detection",
            });
        }
        if let Some(amd) = options.advanced_machine_detection.as_ref() {
            amd.validate()?;
        }
        Ok(Self {
            to: to.into(),
            instructions,
            options,
        })
    }

    pub fn to(&self) -> &Endpoint {
        &self.to
    }

    pub fn instructions(&self) -> &CallInstructions {
        &self.instructions
    }

    pub fn options(&self) -> &CreateCallOptions {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum CallStatus {
    Started,
    Ringing,
    Answered,
    Machine,
    Completed,
    Busy,
    Cancelled,
    Failed,
    Rejected,
    Timeout,
    Unanswered,
}

impl CallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Ringing => "ringing",
            Self::Answered => "answered",
            Self::Machine => "machine",
            Self::Completed => "completed",
            Self::Busy => "busy",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
            Self::Timeout => "timeout",
            Self::Unanswered => "unanswered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Outbound,
    Inbound,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Returned by `create_call`.
pub struct CallResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<CallStatus>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub direction: Option<CallDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_uuid: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallParty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Call record returned by `get_call` and `list_calls`.
pub struct CallInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<CallParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<CallParty>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<CallStatus>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub direction: Option<CallDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HalLinks>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallsEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<Vec<CallInfo>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Query filter of `list_calls`.
pub struct CallsFilter {
    status: Option<CallStatus>,
    date_start: Option<DateTime<Utc>>,
    date_end: Option<DateTime<Utc>>,
    page_size: Option<u32>,
    record_index: Option<u32>,
    order: Option<SortOrder>,
    conversation_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallsFilterOptions {
    pub status: Option<CallStatus>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    pub page_size: Option<u32>,
    pub record_index: Option<u32>,
    pub order: Option<SortOrder>,
    pub conversation_uuid: Option<String>,
}

impl CallsFilter {
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn new(options: CallsFilterOptions) -> Result<Self, ValidationError> {
        if let Some(page_size) = options.page_size {
            check_range("page_size", i64::from(page_size), 1, i64::from(Self::MAX_PAGE_SIZE))?;
        }
        if let (Some(start), Some(end)) = (options.date_start, options.date_end) {
            if end < start {
                return Err(ValidationError::Invalid {
                    field: "date_end",
                    reason: "must not precede date_start",
                });
            }
        }
        Ok(Self {
            status: options.status,
            date_start: options.date_start,
            date_end: options.date_end,
            page_size: options.page_size,
            record_index: options.record_index,
            order: options.order,
            conversation_uuid: options.conversation_uuid,
        })
    }

    pub fn status(&self) -> Option<CallStatus> {
        self.status
    }

    pub fn date_start(&self) -> Option<DateTime<Utc>> {
        self.date_start
    }

    pub fn date_end(&self) -> Option<DateTime<Utc>> {
        self.date_end
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn record_index(&self) -> Option<u32> {
        self.record_index
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    pub fn conversation_uuid(&self) -> Option<&str> {
        self.conversation_uuid.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// In-progress call modification (`PUT /v1/calls/{uuid}`).
pub enum ModifyCall {
    Hangup,
    Mute,
    Unmute,
    Earmuff,
    Unearmuff,
    /// Replace the call flow with a new NCCO.
    TransferNcco(Ncco),
    /// Replace the call flow with the NCCO served at a URL.
    TransferUrl(Url),
}

impl ModifyCall {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Hangup => "hangup",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
            Self::Earmuff => "earmuff",
            Self::Unearmuff => "unearmuff",
            Self::TransferNcco(_) | Self::TransferUrl(_) => "transfer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Target of a call modification.
pub struct CallModification {
    call: CallId,
    action: ModifyCall,
}

impl CallModification {
    pub fn new(call: CallId, action: ModifyCall) -> Result<Self, ValidationError> {
        if let ModifyCall::TransferNcco(ncco) = &action {
            if ncco.is_empty() {
                return Err(ValidationError::Empty { field: "ncco" });
            }
        }
        Ok(Self { call, action })
    }

    pub fn call(&self) -> &CallId {
        &self.call
    }

    pub fn action(&self) -> &ModifyCall {
        &self.action
    }
}
