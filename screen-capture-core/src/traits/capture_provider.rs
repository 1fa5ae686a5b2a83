use crate::models::error::CaptureError;
use crate::models::source::CaptureSource;
use crate::pipeline::frame::FrameStream;

/// Stream parameters requested from the backend.
///
/// Dimensions come pre-shaped by the resolution policy (quality cap
/// applied, both values even). There is deliberately no audio field: this
/// pipeline records video only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    pub width: u32,
    pub height: u32,
    pub min_frame_rate: u32,
    pub max_frame_rate: u32,
    pub show_cursor: bool,
}

/// Interface for platform-specific capture backends.
///
/// Implementations enumerate what the OS can capture and open live frame
/// streams from one source. The backend owns a capture thread per open
/// stream and must honor `FrameStream::stop()` by winding that thread
/// down and releasing the OS capture handle.
pub trait CaptureProvider: Send + Sync {
    /// Enumerate capturable screens and windows, fresh on every call.
    fn enumerate_sources(&self) -> Result<Vec<CaptureSource>, CaptureError>;

    /// Open a live stream from `source_id` at (up to) the requested
    /// dimensions. The returned stream reports the dimensions actually
    /// negotiated, which may be smaller.
    fn open_stream(
        &self,
        source_id: &str,
        params: &StreamParams,
    ) -> Result<FrameStream, CaptureError>;
}
