use crate::models::error::CaptureError;
use crate::pipeline::frame::VideoFrame;

/// Encoder parameters fixed for the lifetime of one session.
///
/// `width`/`height` are the pixel dimensions of the frames the encoder
/// will actually receive — for cropped recordings that is the scaled
/// canvas size, not the logical selection the payload reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub bitrate_bps: u64,
}

/// One encoder-emitted slice of encoded media, ordered by arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedChunk {
    pub data: Vec<u8>,
}

impl EncodedChunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Interface for pluggable video encoders.
///
/// The session drives the cadence: it pushes frames as they arrive and
/// polls for a chunk once per slice interval. `finish` is the finalize
/// point and is called exactly once per recording; afterwards the encoder
/// is spent and the session drops it.
pub trait VideoEncoder: Send {
    /// Prepare for a new stream of frames.
    fn begin(&mut self, config: &EncoderConfig) -> Result<(), CaptureError>;

    /// Encode one frame. Frames arrive in presentation order.
    fn push_frame(&mut self, frame: &VideoFrame) -> Result<(), CaptureError>;

    /// Take whatever encoded bytes have accumulated since the last poll,
    /// or `None` when nothing is ready yet.
    fn poll_chunk(&mut self) -> Result<Option<EncodedChunk>, CaptureError>;

    /// Flush and finalize, returning any trailing chunks in order.
    fn finish(&mut self) -> Result<Vec<EncodedChunk>, CaptureError>;
}
