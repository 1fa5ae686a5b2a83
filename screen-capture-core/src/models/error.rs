use thiserror::Error;

/// Errors that can occur during capture and recording operations.
///
/// Stale commands (pause/resume/stop delivered in a state where they do
/// not apply) are deliberately *not* errors; the session swallows them as
/// no-ops so duplicate or late IPC delivery stays harmless.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("encoder error: {0}")]
    EncoderError(String),

    #[error("recording produced no data")]
    EmptyPayload,

    #[error("selection too small to capture")]
    InvalidSelection,

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("timeout")]
    Timeout,

    #[error("unknown error: {0}")]
    Unknown(String),
}
