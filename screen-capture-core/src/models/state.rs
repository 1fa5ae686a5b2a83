use super::error::CaptureError;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → recording ⇄ paused
///            ↓         ↓
///         stopping → stopped
/// ```
/// `failed` is reachable from any state on unrecoverable error.
/// `stopped` and `failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Recording { duration_secs: f64 },
    Paused { duration_secs: f64 },
    Stopping,
    Stopped,
    Failed(CaptureError),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    /// Whether the session is live in either the recording or paused sense.
    pub fn is_active(&self) -> bool {
        self.is_recording() || self.is_paused()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }

    /// Returns the current duration if in a state that tracks it.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Recording { duration_secs } | Self::Paused { duration_secs } => {
                Some(*duration_secs)
            }
            _ => None,
        }
    }
}
