use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured capture of an exception attached to a log event.
///
/// Always serialized as an object, never as a flattened string dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    pub stack_trace: Option<String>,
}

/// Raw log event as handed over by the host logging pipeline.
///
/// `properties` keeps the source ordering. Duplicate keys are allowed here
/// and collapse last-write-wins when the record is built.
#[derive(Debug, Clone, Default)]
pub struct RawEvent {
    pub domain: String,
    pub identity: String,
    pub level_value: i64,
    pub level_name: String,
    pub logger_name: String,
    pub properties: Vec<(String, serde_json::Value)>,
    pub rendered_message: String,
    pub thread_name: String,
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
    pub exception: Option<ExceptionInfo>,
}

/// Immutable, wire-ready form of one log event.
///
/// Field names serialize in the casing the ingestion service already
/// stores, so renaming any of them is a breaking change for existing
/// deployments. The timestamp is the one supplied by the caller and is
/// not touched at serialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRecord {
    pub domain: String,
    pub exception_object: Option<ExceptionInfo>,
    pub identity: String,
    pub level_value: i64,
    pub level_name: String,
    pub logger_name: String,
    pub properties: BTreeMap<String, serde_json::Value>,
    pub message: String,
    pub thread_name: String,
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
}

impl EventRecord {
    /// Build a record using the event's pre-rendered message text.
    pub fn new(event: RawEvent) -> Self {
        Self::build(event, None::<fn(&RawEvent) -> String>)
    }

    /// Build a record, rendering the message through `format`.
    ///
    /// **Parameters**
    /// - `event`: the raw event to capture.
    /// - `format`: formatting strategy (e.g. applying a layout template).
    ///   Invoked exactly once; its return value becomes `message`.
    pub fn with_formatter<F>(event: RawEvent, format: F) -> Self
    where
        F: FnOnce(&RawEvent) -> String,
    {
        Self::build(event, Some(format))
    }

    fn build<F>(event: RawEvent, format: Option<F>) -> Self
    where
        F: FnOnce(&RawEvent) -> String,
    {
        let message = match format {
            Some(format) => format(&event),
            None => event.rendered_message.clone(),
        };

        // Iterate the source's ordered key list; a later write to the
        // same key wins.
        let mut properties = BTreeMap::new();
        for (key, value) in event.properties {
            properties.insert(key, value);
        }

        EventRecord {
            domain: event.domain,
            exception_object: event.exception,
            identity: event.identity,
            level_value: event.level_value,
            level_name: event.level_name,
            logger_name: event.logger_name,
            properties,
            message,
            thread_name: event.thread_name,
            timestamp: event.timestamp,
            user_name: event.user_name,
        }
    }
}
