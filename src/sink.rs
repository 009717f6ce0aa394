use crate::error::PublishError;
use crate::record::EventRecord;

/// Destination for [`EventRecord`]s produced by a logging pipeline.
///
/// Implementations are responsible for transporting records to a concrete
/// backend. `publish` is synchronous: it blocks the calling thread for the
/// full round trip (DNS, TLS, send, response). Implementations hold no
/// state across calls other than their immutable configuration, so calls
/// from concurrent threads are independent.
pub trait EventSink: Send + Sync {
    /// Deliver a single record, exactly one attempt.
    ///
    /// **Parameters**
    /// - `record`: fully-populated [`EventRecord`].
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the record.
    /// - `Err(..)` on configuration, transport or service failure. The
    ///   sink performs no retry and stays usable for the next record; the
    ///   caller decides whether to log, drop or escalate.
    fn publish(&self, record: &EventRecord) -> Result<(), PublishError>;
}
