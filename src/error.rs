use thiserror::Error;

/// Errors crossing the transport boundary. These never escalate past the
/// reader runtime: a failed read marks the session `Error` and the session
/// recovers to `Idle` after a cool-down.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("transport already closed")]
    Closed,
}

/// Why a textual record was dropped by the parser. Rejections are silent:
/// instrument noise is expected and must not halt ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("record is empty after trimming")]
    Empty,
    #[error("record contains a non-numeric field")]
    NonNumeric,
}

/// Failure reported by the opaque analysis service.
#[derive(Debug, Error)]
#[error("analysis request failed: {0}")]
pub struct AnalysisError(pub String);
