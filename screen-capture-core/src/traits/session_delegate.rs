use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingPayload, RecordingStatus};
use crate::models::state::SessionState;

/// Event delegate for recording session notifications.
///
/// Methods are called from the session's worker threads, not the UI
/// thread; implementations forward across the window boundary as
/// messages and must not block.
pub trait SessionDelegate: Send + Sync {
    /// Called on every state transition.
    fn on_state_changed(&self, state: &SessionState);

    /// Called roughly once per second with duration/pause status.
    fn on_status(&self, status: &RecordingStatus);

    /// Called when the session fails; fires only after the session's
    /// streams have been released.
    fn on_error(&self, error: &CaptureError);

    /// Called once when a stop completes and the payload is assembled.
    fn on_finished(&self, payload: &RecordingPayload);
}

/// Delegate that ignores every notification, for callers that only poll.
pub struct NullDelegate;

impl SessionDelegate for NullDelegate {
    fn on_state_changed(&self, _state: &SessionState) {}
    fn on_status(&self, _status: &RecordingStatus) {}
    fn on_error(&self, _error: &CaptureError) {}
    fn on_finished(&self, _payload: &RecordingPayload) {}
}
