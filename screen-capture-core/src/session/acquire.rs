//! Stream acquisition.
//!
//! Validates the request, shapes the stream parameters through the
//! resolution policy, and opens the backend stream. Audio is never
//! requested here regardless of what the request asks for; this pipeline
//! records video only.

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::geometry::DisplayInfo;
use crate::models::request::CaptureRequest;
use crate::pipeline::frame::FrameStream;
use crate::pipeline::resolution;
use crate::traits::capture_provider::{CaptureProvider, StreamParams};

/// Open a raw stream for `request` on `display`.
///
/// Any backend failure surfaces as `SourceUnavailable`; the caller owns
/// releasing whatever it had already acquired.
pub fn acquire(
    provider: &dyn CaptureProvider,
    request: &CaptureRequest,
    display: &DisplayInfo,
    config: &CaptureConfig,
) -> Result<FrameStream, CaptureError> {
    request.validate()?;

    let (width, height) = resolution::capture_dimensions(display, request.quality);
    let params = StreamParams {
        width,
        height,
        min_frame_rate: config.min_frame_rate,
        max_frame_rate: config.max_frame_rate,
        show_cursor: config.show_cursor,
    };

    log::info!(
        "acquiring stream from {}: {}x{} @ {}-{} fps",
        request.source_id,
        width,
        height,
        params.min_frame_rate,
        params.max_frame_rate
    );

    provider
        .open_stream(&request.source_id, &params)
        .map_err(|e| match e {
            e @ CaptureError::SourceUnavailable(_) => e,
            other => CaptureError::SourceUnavailable(other.to_string()),
        })
}
