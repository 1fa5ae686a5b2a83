//! Built-in uncompressed encoder.
//!
//! Converts incoming BGRA frames to I420 and frames them as YUV4MPEG2.
//! Because the container is pure concatenation, chunk slices polled off
//! this encoder and glued together in arrival order are a playable
//! `.y4m` file. Deployments wanting compressed output plug a different
//! `VideoEncoder` in at the same seam.

use crate::models::error::CaptureError;
use crate::pipeline::frame::{VideoFrame, BYTES_PER_PIXEL};
use crate::pipeline::resolution::force_even;
use crate::pipeline::{y4m_format, yuv};
use crate::traits::video_encoder::{EncodedChunk, EncoderConfig, VideoEncoder};

/// Uncompressed YUV4MPEG2 encoder.
///
/// The stream header is written lazily from the first frame's actual
/// dimensions (trimmed to even), since cropped streams can deliver frames
/// at a slightly different size than the configured estimate.
pub struct Y4mEncoder {
    config: Option<EncoderConfig>,
    frame_dims: Option<(u32, u32)>,
    pending: Vec<u8>,
    finished: bool,
}

impl Y4mEncoder {
    pub fn new() -> Self {
        Self {
            config: None,
            frame_dims: None,
            pending: Vec::new(),
            finished: false,
        }
    }

    /// Trim a frame to even dimensions, copying only when needed.
    fn evened(frame: &VideoFrame) -> (u32, u32, Vec<u8>) {
        let w = force_even(frame.width.max(2));
        let h = force_even(frame.height.max(2));
        if w == frame.width && h == frame.height {
            return (w, h, frame.data.clone());
        }
        let src_stride = frame.width as usize * BYTES_PER_PIXEL;
        let row_bytes = w as usize * BYTES_PER_PIXEL;
        let mut data = Vec::with_capacity(row_bytes * h as usize);
        for row in 0..h as usize {
            let start = row * src_stride;
            data.extend_from_slice(&frame.data[start..start + row_bytes]);
        }
        (w, h, data)
    }
}

impl Default for Y4mEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoEncoder for Y4mEncoder {
    fn begin(&mut self, config: &EncoderConfig) -> Result<(), CaptureError> {
        if self.config.is_some() {
            return Err(CaptureError::EncoderError("encoder already started".into()));
        }
        self.config = Some(*config);
        Ok(())
    }

    fn push_frame(&mut self, frame: &VideoFrame) -> Result<(), CaptureError> {
        let config = self
            .config
            .ok_or_else(|| CaptureError::EncoderError("encoder not started".into()))?;
        if self.finished {
            return Err(CaptureError::EncoderError("encoder already finalized".into()));
        }
        if !frame.is_well_formed() {
            // Backends occasionally deliver short buffers; skip rather
            // than desync the plane layout.
            log::warn!(
                "skipping malformed frame: {} bytes for {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            );
            return Ok(());
        }

        let (w, h, bgra) = Self::evened(frame);
        match self.frame_dims {
            None => {
                self.frame_dims = Some((w, h));
                self.pending
                    .extend_from_slice(&y4m_format::stream_header(w, h, config.frame_rate, 1));
            }
            Some(dims) if dims != (w, h) => {
                // Frame size changed mid-stream; the container cannot
                // represent that, so drop the frame.
                log::warn!("dropping {}x{} frame in {}x{} stream", w, h, dims.0, dims.1);
                return Ok(());
            }
            Some(_) => {}
        }

        self.pending.extend_from_slice(y4m_format::FRAME_MARKER);
        self.pending.extend(yuv::bgra_to_i420(&bgra, w, h));
        Ok(())
    }

    fn poll_chunk(&mut self) -> Result<Option<EncodedChunk>, CaptureError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        Ok(Some(EncodedChunk {
            data: std::mem::take(&mut self.pending),
        }))
    }

    fn finish(&mut self) -> Result<Vec<EncodedChunk>, CaptureError> {
        if self.finished {
            return Err(CaptureError::EncoderError("encoder already finalized".into()));
        }
        self.finished = true;
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![EncodedChunk {
            data: std::mem::take(&mut self.pending),
        }])
    }
}
