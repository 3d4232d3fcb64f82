//! Error types for scan-report decoding.

use thiserror::Error;

/// Report decoding result type.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors raised while decoding a scan report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Malformed JSON or a shape mismatch.
    #[error("Report JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record references a packet id missing from the packet dictionary.
    #[error("Unknown packet id: {0}")]
    UnknownPacket(String),

    /// A record or completion entry references an unknown state id.
    #[error("Unknown state id: {0}")]
    UnknownState(String),
}
