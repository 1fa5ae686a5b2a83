use crate::models::error::CaptureError;
use crate::models::recording_result::{MediaFormat, RecordingPayload, StoredFile};

/// Persistence collaborator receiving finished captures.
///
/// The capture core hands over the assembled payload and gets back a
/// stored-file descriptor; directory layout and naming are the store's
/// business. A zero-byte payload must be treated as a failed capture
/// (`CaptureError::EmptyPayload`), never persisted as an empty file.
pub trait MediaStore: Send + Sync {
    fn store(
        &self,
        payload: &RecordingPayload,
        format: MediaFormat,
    ) -> Result<StoredFile, CaptureError>;
}
