use crate::error::PublishError;
use crate::record::EventRecord;
use crate::sink::EventSink;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of record construction without any
/// network I/O, and for unit tests that don't care about delivery.
#[derive(Clone, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn publish(&self, _record: &EventRecord) -> Result<(), PublishError> {
        Ok(())
    }
}
