use thiserror::Error;

/// Failure of a single publish attempt.
///
/// All variants surface synchronously to the caller; the sink never logs
/// its own failures (that would feed back into the pipeline it serves)
/// and never retries. A failed attempt leaves the sink usable for the
/// next event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Missing or malformed configuration, e.g. a shared key that is not
    /// valid base64. Recurs deterministically until the config is fixed.
    #[error("invalid sink configuration: {0}")]
    Configuration(String),

    /// The event record could not be encoded as JSON.
    #[error("failed to serialize event record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// DNS, TLS, connection or timeout failure before a status line was
    /// received.
    #[error("request could not be delivered: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a status outside {200, 202}.
    #[error("service rejected the event with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
}
