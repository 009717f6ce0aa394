use crate::record::{EventRecord, RawEvent};
use crate::sink::EventSink;
use chrono::Utc;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`EventRecord`]s and
/// hands them to an [`EventSink`] on the emitting thread.
///
/// Delivery is synchronous: the thread that fired the event blocks until
/// the sink returns. Inside an async runtime, wrap the sink in your own
/// bridge instead of installing this layer directly. Publish failures are
/// written to stderr and never fed back into `tracing`.
pub struct PublishLayer {
    sink: Arc<dyn EventSink>,
    min_level: Level,
    domain: String,
}

impl PublishLayer {
    /// Create a layer that forwards events at `min_level` or more severe.
    ///
    /// **Parameters**
    /// - `sink`: destination for the resulting records.
    /// - `min_level`: least severe level that is still published.
    /// - `domain`: logical execution context stamped on every record.
    pub fn new(sink: Arc<dyn EventSink>, min_level: Level, domain: impl Into<String>) -> Self {
        PublishLayer {
            sink,
            min_level,
            domain: domain.into(),
        }
    }
}

/// Numeric severity on the scale the ingestion schema stores. Values are
/// monotonic with severity so stored records can be range-filtered.
fn level_value(level: &Level) -> (i64, &'static str) {
    if *level == Level::ERROR {
        (70_000, "ERROR")
    } else if *level == Level::WARN {
        (60_000, "WARN")
    } else if *level == Level::INFO {
        (40_000, "INFO")
    } else if *level == Level::DEBUG {
        (30_000, "DEBUG")
    } else {
        (20_000, "TRACE")
    }
}

impl<S> Layer<S> for PublishLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        // tracing orders levels most-severe-first.
        if *event.metadata().level() > self.min_level {
            return;
        }

        let mut properties = Vec::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            properties: &mut properties,
            message: &mut message,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        let (value, name) = level_value(meta.level());
        let raw = RawEvent {
            domain: self.domain.clone(),
            identity: String::new(),
            level_value: value,
            level_name: name.to_string(),
            logger_name: meta.target().to_string(),
            properties,
            rendered_message: message.unwrap_or_default(),
            thread_name: std::thread::current()
                .name()
                .unwrap_or_default()
                .to_string(),
            timestamp: Utc::now(),
            user_name: String::new(),
            exception: None,
        };

        let record = EventRecord::new(raw);
        if let Err(e) = self.sink.publish(&record) {
            eprintln!("failed to publish log record: {}", e);
        }
    }
}

/// Collects event fields in declaration order; `message` is split out of
/// the property list.
struct FieldVisitor<'a> {
    properties: &'a mut Vec<(String, serde_json::Value)>,
    message: &'a mut Option<String>,
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.properties.push((
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            ));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.properties
            .push((field.name().to_string(), serde_json::Value::from(value)));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.properties
            .push((field.name().to_string(), serde_json::Value::from(value)));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.properties
            .push((field.name().to_string(), serde_json::Value::from(value)));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.properties
            .push((field.name().to_string(), serde_json::Value::from(value)));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.properties.push((
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value)),
            ));
        }
    }
}
