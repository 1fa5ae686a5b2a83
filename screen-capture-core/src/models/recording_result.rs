use serde::{Deserialize, Serialize};

/// The assembled output of one recording: every encoded chunk concatenated
/// in arrival order, plus the dimensions and active duration.
///
/// `width`/`height` are in area-space units for cropped recordings — the
/// logical selection size, not the scaled canvas the encoder consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingPayload {
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

impl RecordingPayload {
    /// The explicit no-data payload produced when a session stops before
    /// the first chunk slice. Distinguishable from a hang, never an error.
    pub fn empty(duration_secs: f64) -> Self {
        Self {
            buffer: Vec::new(),
            width: 0,
            height: 0,
            duration_secs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Container format of a stored capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Png,
    Webm,
    Y4m,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webm => "webm",
            Self::Y4m => "y4m",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Webm => "video/webm",
            Self::Y4m => "video/x-yuv4mpeg",
        }
    }
}

/// Metadata recorded alongside a capture in the gallery.
///
/// Serializable for the JSON sidecar the store writes next to each file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub content_type: String,
    pub checksum: String,
    pub created_at: String,
}

impl CaptureMetadata {
    /// Stamp metadata for a payload about to be persisted.
    pub fn new(payload: &RecordingPayload, format: MediaFormat, checksum: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            width: payload.width,
            height: payload.height,
            duration_secs: payload.duration_secs,
            content_type: format.content_type().to_string(),
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Descriptor returned by the persistence collaborator for a stored capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    pub filepath: String,
    pub filename: String,
    pub size: u64,
    pub created_at: String,
}

/// Broadcast recording status, consumed by every interested window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStatus {
    pub is_recording: bool,
    pub is_paused: bool,
    pub duration_secs: f64,
}

impl RecordingStatus {
    pub fn idle() -> Self {
        Self {
            is_recording: false,
            is_paused: false,
            duration_secs: 0.0,
        }
    }
}
