//! Still capture.
//!
//! A screenshot is one frame pulled off a freshly acquired stream,
//! optionally cropped to the selection, PNG-encoded. The stream is
//! stopped before this returns no matter which step failed.

use std::io::Cursor;
use std::time::{Duration, Instant};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::geometry::DisplayInfo;
use crate::models::request::CaptureRequest;
use crate::models::source::SourceKind;
use crate::pipeline::crop;
use crate::pipeline::frame::{FrameStream, VideoFrame};
use crate::session::acquire;
use crate::traits::capture_provider::CaptureProvider;

const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
const FIRST_FRAME_POLL: Duration = Duration::from_millis(20);

pub struct Screenshot {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Id of the first screen-kind source the backend reports.
pub fn primary_screen_id(provider: &dyn CaptureProvider) -> Result<String, CaptureError> {
    provider
        .enumerate_sources()?
        .into_iter()
        .find(|s| s.kind == SourceKind::Screen)
        .map(|s| s.id)
        .ok_or_else(|| CaptureError::SourceUnavailable("no screen to capture".into()))
}

/// Capture a single frame for `request` and encode it as PNG.
pub fn capture_screenshot(
    provider: &dyn CaptureProvider,
    request: &CaptureRequest,
    display: &DisplayInfo,
    config: &CaptureConfig,
) -> Result<Screenshot, CaptureError> {
    let stream = acquire::acquire(provider, request, display, config)?;
    let frame = wait_for_first_frame(&stream);
    let negotiated_width = stream.width();
    stream.stop();
    let frame = frame?;

    let frame = match &request.area {
        Some(area) => {
            let rect = crop::source_pixel_rect(area, display, negotiated_width);
            crop::crop_frame(&frame, &rect)?
        }
        None => frame,
    };

    let png = encode_png(&frame)?;
    log::info!(
        "screenshot captured: {}x{}, {} bytes",
        frame.width,
        frame.height,
        png.len()
    );
    Ok(Screenshot {
        png,
        width: frame.width,
        height: frame.height,
    })
}

fn wait_for_first_frame(stream: &FrameStream) -> Result<VideoFrame, CaptureError> {
    let start = Instant::now();
    while start.elapsed() < FIRST_FRAME_TIMEOUT {
        if let Some(frame) = stream.next_frame() {
            return Ok(frame);
        }
        if !stream.is_live() {
            return Err(CaptureError::SourceUnavailable("stream ended".into()));
        }
        std::thread::sleep(FIRST_FRAME_POLL);
    }
    log::warn!("no frame arrived within {:?}", FIRST_FRAME_TIMEOUT);
    Err(CaptureError::Timeout)
}

fn encode_png(frame: &VideoFrame) -> Result<Vec<u8>, CaptureError> {
    if !frame.is_well_formed() {
        return Err(CaptureError::EncoderError("malformed frame".into()));
    }

    // BGRA → RGBA channel swap.
    let mut rgba = frame.data.clone();
    for pixel in rgba.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }

    let img = RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| CaptureError::EncoderError("frame dimensions mismatch".into()))?;

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CaptureError::EncoderError(format!("png encoding failed: {}", e)))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::Rectangle;
    use crate::models::request::{AudioOptions, CaptureMode, Quality};
    use crate::session::testing::FakeProvider;

    fn display() -> DisplayInfo {
        DisplayInfo { width: 1280, height: 720, scale_factor: 1.0 }
    }

    fn request(area: Option<Rectangle>) -> CaptureRequest {
        CaptureRequest {
            mode: if area.is_some() { CaptureMode::Area } else { CaptureMode::FullScreen },
            source_id: "screen:0".into(),
            area,
            audio: AudioOptions::default(),
            quality: Quality::High,
        }
    }

    #[test]
    fn produces_png_bytes() {
        let mut provider = FakeProvider::new();
        provider.preload_frames = 1;

        let shot =
            capture_screenshot(&provider, &request(None), &display(), &CaptureConfig::default())
                .unwrap();

        assert_eq!(&shot.png[..4], &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!((shot.width, shot.height), (1280, 720));
        assert_eq!(provider.live_count(), 0, "stream must be released");
    }

    #[test]
    fn crops_to_the_selection() {
        let mut provider = FakeProvider::new();
        provider.preload_frames = 1;

        let area = Rectangle::new(100, 60, 320, 200);
        let shot = capture_screenshot(
            &provider,
            &request(Some(area)),
            &display(),
            &CaptureConfig::default(),
        )
        .unwrap();

        assert_eq!((shot.width, shot.height), (320, 200));
        let decoded = image::load_from_memory(&shot.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 200));
    }

    #[test]
    fn dead_stream_reports_unavailable_and_releases() {
        use std::sync::Arc;

        let provider = Arc::new(FakeProvider::new()); // never delivers a frame
        let killer = std::thread::spawn({
            let provider = Arc::clone(&provider);
            move || {
                // Stop the stream out from under the frame wait.
                for _ in 0..200 {
                    if let Some(stream) = provider.opened.lock().last().cloned() {
                        stream.stop();
                        return;
                    }
                    std::thread::sleep(Duration::from_millis(5));
                }
            }
        });

        let result = capture_screenshot(
            provider.as_ref(),
            &request(None),
            &display(),
            &CaptureConfig::default(),
        );
        killer.join().unwrap();

        assert!(matches!(result, Err(CaptureError::SourceUnavailable(_))));
        assert_eq!(provider.live_count(), 0);
    }

    #[test]
    fn primary_screen_is_the_first_screen_source() {
        let provider = FakeProvider::new();
        assert_eq!(primary_screen_id(&provider).unwrap(), "screen:0");
    }
}
