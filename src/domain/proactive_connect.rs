//! Proactive Connect bulk API: contact lists, list items and run events.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::lenient;
use crate::domain::pagination::{PageFilter, PageLimits};
use crate::domain::validation::{ValidationError, check_length, require_non_blank};
use crate::domain::value::SortOrder;

pub const LIST_NAME_MAX: usize = 255;
pub const LIST_DESCRIPTION_MAX: usize = 1024;
pub const LIST_MAX_TAGS: usize = 10;
pub const LIST_TAG_MAX: usize = 15;

/// Page bounds shared by every Proactive Connect listing.
pub const PAGE_LIMITS: PageLimits = PageLimits {
    min_page: 1,
    min_page_size: 1,
    max_page_size: 1000,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Where list items come from.
pub enum Datasource {
    Manual,
    Salesforce(SalesforceDatasource),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesforceDatasource {
    pub integration_id: String,
    pub soql: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// `datasource` as received: typed when recognised, raw JSON otherwise.
enum DatasourceField {
    Known(Datasource),
    Unknown(Value),
}

impl SalesforceDatasource {
    pub fn new(
        integration_id: impl Into<String>,
        soql: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            integration_id: require_non_blank("integration_id", integration_id)?,
            soql: require_non_blank("soql", soql)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Whether the attribute identifies an item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_modified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_modified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dirty: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactsListOptions {
    pub description: Option<String>,
    /// Repeated tags are collapsed to their first occurrence before the
    /// ten-tag limit is checked.
    pub tags: Vec<String>,
    pub attributes: Vec<ListAttribute>,
    pub datasource: Option<Datasource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Contact list. Built with [`ContactsList::new`] for create/update, decoded
/// as-is from responses.
pub struct ContactsList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<Vec<ListAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datasource: Option<DatasourceField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sync_status: Option<SyncStatus>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl ContactsList {
    /// At most ten distinct tags, each at most fifteen characters. Duplicate
    /// tags are dropped rather than rejected.
    pub fn new(name: impl Into<String>, options: ContactsListOptions) -> Result<Self, ValidationError> {
        let name = name.into();
        check_length("name", &name, 1, LIST_NAME_MAX)?;
        if let Some(description) = options.description.as_deref() {
            check_length("description", description, 0, LIST_DESCRIPTION_MAX)?;
        }

        let mut tags: Vec<String> = Vec::with_capacity(options.tags.len());
        for tag in options.tags {
            check_length("tags", &tag, 1, LIST_TAG_MAX)?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.len() > LIST_MAX_TAGS {
            return Err(ValidationError::TooMany {
                field: "tags",
                max: LIST_MAX_TAGS,
                actual: tags.len(),
            });
        }

        Ok(Self {
            id: None,
            name: Some(name),
            description: options.description,
            tags: (!tags.is_empty()).then_some(tags),
            attributes: (!options.attributes.is_empty()).then_some(options.attributes),
            datasource: options.datasource.map(DatasourceField::Known),
            items_count: None,
            sync_status: None,
            created_at: None,
            updated_at: None,
            extra: BTreeMap::new(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn attributes(&self) -> Option<&[ListAttribute]> {
        self.attributes.as_deref()
    }

    /// `None` when absent or of an unrecognised type.
    pub fn datasource(&self) -> Option<&Datasource> {
        match self.datasource.as_ref()? {
            DatasourceField::Known(datasource) => Some(datasource),
            DatasourceField::Unknown(_) => None,
        }
    }

    /// Raw `datasource` object when its type is not recognised.
    pub fn unknown_datasource(&self) -> Option<&Value> {
        match self.datasource.as_ref()? {
            DatasourceField::Known(_) => None,
            DatasourceField::Unknown(raw) => Some(raw),
        }
    }

    pub fn items_count(&self) -> Option<u64> {
        self.items_count
    }

    pub fn sync_status(&self) -> Option<&SyncStatus> {
        self.sync_status.as_ref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    /// Attribute values of the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListsEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<ContactsList>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemsEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ListItem>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventsEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<ProactiveEvent>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Result of a CSV upload.
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ProactiveEventType {
    ActionCallSucceeded,
    ActionCallFailed,
    RecipientResponse,
    RunItemSkipped,
    RunItemSubmitted,
    RunItemsTotal,
    RunItemsReady,
    RunPaused,
    RunResumed,
    RunStarted,
    RunSucceeded,
    RunFailed,
    RunStopped,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Telemetry of a job run.
pub struct ProactiveEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<ProactiveEventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_ctx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventsFilterOptions {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub order: Option<SortOrder>,
    pub run_id: Option<String>,
    pub invocation_id: Option<String>,
    pub action_id: Option<String>,
    pub trace_id: Option<String>,
    pub recipient_id: Option<String>,
    pub src_ctx: Option<String>,
    pub src_type: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Query filter of the events listing.
pub struct EventsFilter {
    page: PageFilter,
    options: EventsFilterOptions,
}

impl EventsFilter {
    pub fn new(options: EventsFilterOptions) -> Result<Self, ValidationError> {
        let page = PageFilter::new(options.page, options.page_size, options.order, PAGE_LIMITS)?;
        if let (Some(start), Some(end)) = (options.start_date, options.end_date) {
            if end < start {
                return Err(ValidationError::Invalid {
                    field: "end_date",
                    reason: "must not precede start_date",
                });
            }
        }
        Ok(Self { page, options })
    }

    pub fn page(&self) -> &PageFilter {
        &self.page
    }

    pub fn options(&self) -> &EventsFilterOptions {
        &self.options
    }
}
