use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::EventError;

/// Row payload carried by a change event
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Change kinds delivered by the feed.
///
/// `All` is only used when registering a listener; concrete events are always
/// one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "INSERT")]
    Insert,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "*")]
    All,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Insert => "INSERT",
            EventType::Update => "UPDATE",
            EventType::Delete => "DELETE",
            EventType::All => "*",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound change notification
///
/// Wire shape matches the backend's change payload:
/// `{"table": "rooms", "eventType": "UPDATE", "old": {...}, "new": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,

    #[serde(rename = "eventType")]
    pub event_type: EventType,

    #[serde(rename = "old", default, skip_serializing_if = "Option::is_none")]
    pub old_record: Option<Record>,

    #[serde(rename = "new", default, skip_serializing_if = "Option::is_none")]
    pub new_record: Option<Record>,
}

impl ChangeEvent {
    pub fn insert(
        table: impl Into<String>,
        new_record: Record,
    ) -> Self {
        Self {
            table: table.into(),
            event_type: EventType::Insert,
            old_record: None,
            new_record: Some(new_record),
        }
    }

    pub fn update(
        table: impl Into<String>,
        old_record: Record,
        new_record: Record,
    ) -> Self {
        Self {
            table: table.into(),
            event_type: EventType::Update,
            old_record: Some(old_record),
            new_record: Some(new_record),
        }
    }

    pub fn delete(
        table: impl Into<String>,
        old_record: Record,
    ) -> Self {
        Self {
            table: table.into(),
            event_type: EventType::Delete,
            old_record: Some(old_record),
            new_record: None,
        }
    }

    /// INSERT carries `new`, DELETE carries `old`, UPDATE carries both.
    pub fn validate(&self) -> std::result::Result<(), EventError> {
        let needs_new = matches!(self.event_type, EventType::Insert | EventType::Update);
        let needs_old = matches!(self.event_type, EventType::Delete | EventType::Update);

        if self.event_type == EventType::All {
            return Err(EventError::WildcardEvent {
                table: self.table.clone(),
            });
        }
        if needs_new && self.new_record.is_none() {
            return Err(EventError::MissingNewRecord {
                table: self.table.clone(),
                event_type: self.event_type.as_str(),
            });
        }
        if needs_old && self.old_record.is_none() {
            return Err(EventError::MissingOldRecord {
                table: self.table.clone(),
                event_type: self.event_type.as_str(),
            });
        }
        Ok(())
    }

    /// String or numeric field of the new record, rendered as text
    pub fn new_field(
        &self,
        key: &str,
    ) -> Option<String> {
        let value = self.new_record.as_ref()?.get(key)?;
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
