use serde::{Deserialize, Serialize};

/// What kind of thing a capture source is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Window,
}

/// A capturable screen or window exposed by the OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSource {
    pub id: String,
    pub name: String,
    /// PNG-encoded preview, when the backend can produce one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thumbnail: Option<Vec<u8>>,
    pub kind: SourceKind,
}
