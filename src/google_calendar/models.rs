use crate::error::{calendar_error, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Start or end time in the shape the Calendar API expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// A time as sent by the browser: a bare RFC 3339 string or an API-shaped object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    Timestamp(String),
    Structured(EventDateTime),
}

impl EventTime {
    fn into_remote(self, fallback_tz: &str) -> EventDateTime {
        match self {
            EventTime::Timestamp(date_time) => EventDateTime {
                date_time,
                time_zone: Some(fallback_tz.to_string()),
            },
            EventTime::Structured(EventDateTime {
                date_time,
                time_zone,
            }) => EventDateTime {
                date_time,
                time_zone: Some(time_zone.unwrap_or_else(|| fallback_tz.to_string())),
            },
        }
    }
}

/// Create/update payload accepted from the browser.
///
/// Field presence is not checked here; missing fields are simply left out of
/// the outbound body and the Calendar API decides whether that is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[serde(default, alias = "summary")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
    /// Overrides the configured timezone for both start and end
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl EventInput {
    /// Convert into the Calendar API request body
    pub fn into_remote(self, default_tz: &str) -> RemoteEvent {
        let tz = self.time_zone.as_deref().unwrap_or(default_tz);
        RemoteEvent {
            summary: self.title,
            description: self.description,
            location: self.location,
            start: self.start.map(|t| t.into_remote(tz)),
            end: self.end.map(|t| t.into_remote(tz)),
        }
    }
}

/// Event body sent on insert and patch calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
}

/// Identifier of a remote event record, if it has one
pub fn event_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(|id| id.as_str())
}

/// Check that a single-event response is an object carrying its identifier
pub fn expect_event(record: Value) -> AppResult<Value> {
    if record.is_object() && event_id(&record).is_some_and(|id| !id.is_empty()) {
        Ok(record)
    } else {
        Err(calendar_error("Event response is missing its id"))
    }
}

/// Check that a list response carries an `items` array
pub fn expect_event_list(response: Value) -> AppResult<Value> {
    if response.get("items").is_some_and(Value::is_array) {
        Ok(response)
    } else {
        Err(calendar_error("No items in response"))
    }
}
