use serde::{Deserialize, Serialize};

use crate::ports::Document;

/// Event entity - one entry in a user's agenda.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Event {
    /// Backend-assigned identifier, empty until persisted.
    pub id: String,
    pub owner_id: String,
    pub title: String,
    /// Free-form "DD/MM/YYYY" text, not checked against a calendar.
    pub date: String,
    pub description: String,
}

impl Event {
    /// Remap a stored document into an event, taking the id from the document.
    pub fn from_document(document: &Document) -> Result<Self, serde_json::Error> {
        let record: EventRecord = serde_json::from_value(document.data.clone())?;
        Ok(record.into_event(document.id.clone()))
    }

    pub fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            date: self.date.clone(),
            description: self.description.clone(),
        }
    }
}

/// The caller-editable fields of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub description: String,
}

impl EventDraft {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            description: description.into(),
        }
    }
}

/// Stored shape of an event. The document id lives outside the data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRecord {
    pub user_id: String,
    pub title: String,
    pub date: String,
    pub description: String,
}

impl EventRecord {
    /// Field holding the owner, used to filter subscriptions.
    pub const OWNER_FIELD: &'static str = "userId";

    pub fn new(owner_id: impl Into<String>, draft: EventDraft) -> Self {
        Self {
            user_id: owner_id.into(),
            title: draft.title,
            date: draft.date,
            description: draft.description,
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn into_event(self, id: String) -> Event {
        Event {
            id,
            owner_id: self.user_id,
            title: self.title,
            date: self.date,
            description: self.description,
        }
    }
}
