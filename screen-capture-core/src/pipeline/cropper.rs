//! Live crop pipeline.
//!
//! The capture backends only produce whole-source streams, so area
//! recording is synthesized: a redraw loop samples the newest raw frame
//! at a fixed rate, copies the selection out of it, and feeds a second
//! stream that the rest of the pipeline treats like any other capture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::models::geometry::{DisplayInfo, Rectangle};
use crate::pipeline::crop;
use crate::pipeline::frame::FrameStream;
use crate::pipeline::resolution::PIPELINE_FRAME_RATE;

const OUTPUT_QUEUE_CAPACITY: usize = 8;

/// Cancellable handle to the crop redraw loop.
///
/// The loop samples at 30 fps and stops the instant any of three things
/// happens: `cancel()` is called, the raw stream dies, or the output
/// stream is stopped. `cancel()` joins the thread, so once it returns no
/// further frame is produced.
pub struct CropPipeline {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CropPipeline {
    /// Start cropping `raw` down to `area`.
    ///
    /// The returned stream reports the logical selection's dimensions;
    /// the frames inside carry the scaled source-pixel size.
    pub fn start(
        raw: FrameStream,
        area: Rectangle,
        display: DisplayInfo,
    ) -> (FrameStream, CropPipeline) {
        let rect = crop::source_pixel_rect(&area, &display, raw.width());
        let out = FrameStream::new(area.width, area.height, OUTPUT_QUEUE_CAPACITY);

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let sink = out.clone();

        let handle = thread::Builder::new()
            .name("crop-pipeline".into())
            .spawn(move || {
                let tick = Duration::from_secs(1) / PIPELINE_FRAME_RATE;
                log::debug!("crop loop started: {:?} of {}x{}", rect, raw.width(), raw.height());

                while flag.load(Ordering::SeqCst) && raw.is_live() && sink.is_live() {
                    let tick_start = Instant::now();

                    if let Some(frame) = raw.latest_frame() {
                        match crop::crop_frame(&frame, &rect) {
                            Ok(cropped) => {
                                if !sink.push(cropped) {
                                    break;
                                }
                            }
                            Err(e) => log::warn!("dropping uncroppable frame: {}", e),
                        }
                    }

                    let elapsed = tick_start.elapsed();
                    if elapsed < tick {
                        thread::sleep(tick - elapsed);
                    }
                }
                log::debug!("crop loop finished");
            })
            .expect("failed to spawn crop thread");

        (
            out,
            CropPipeline {
                running,
                handle: Some(handle),
            },
        )
    }

    /// Stop the redraw loop and wait for it. Idempotent; safe to call
    /// from error handlers.
    pub fn cancel(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CropPipeline {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::frame::VideoFrame;

    fn display(width: u32, height: u32) -> DisplayInfo {
        DisplayInfo { width, height, scale_factor: 1.0 }
    }

    fn solid_frame(width: u32, height: u32, tag: u8) -> VideoFrame {
        VideoFrame {
            data: vec![tag; VideoFrame::expected_len(width, height)],
            width,
            height,
            timestamp_ms: tag as u64,
        }
    }

    fn wait_for_frame(stream: &FrameStream) -> Option<VideoFrame> {
        for _ in 0..50 {
            if let Some(frame) = stream.next_frame() {
                return Some(frame);
            }
            thread::sleep(Duration::from_millis(10));
        }
        None
    }

    #[test]
    fn output_reports_logical_dimensions() {
        let raw = FrameStream::new(64, 64, 8);
        let area = Rectangle::new(4, 4, 16, 12);
        let (out, mut pipeline) = CropPipeline::start(raw, area, display(64, 64));

        assert_eq!(out.width(), 16);
        assert_eq!(out.height(), 12);
        pipeline.cancel();
    }

    #[test]
    fn crops_incoming_frames() {
        let raw = FrameStream::new(64, 64, 8);
        let area = Rectangle::new(8, 8, 16, 16);
        let (out, mut pipeline) = CropPipeline::start(raw.clone(), area, display(64, 64));

        raw.push(solid_frame(64, 64, 9));
        let cropped = wait_for_frame(&out).expect("no cropped frame arrived");
        assert_eq!((cropped.width, cropped.height), (16, 16));
        assert_eq!(cropped.data.len(), VideoFrame::expected_len(16, 16));

        pipeline.cancel();
    }

    #[test]
    fn cancel_stops_production_immediately() {
        let raw = FrameStream::new(32, 32, 8);
        let area = Rectangle::new(0, 0, 16, 16);
        let (out, mut pipeline) = CropPipeline::start(raw.clone(), area, display(32, 32));

        raw.push(solid_frame(32, 32, 1));
        wait_for_frame(&out);

        pipeline.cancel();
        out.discard_queued();

        // Frames pushed after cancel returns must never surface.
        raw.push(solid_frame(32, 32, 2));
        thread::sleep(Duration::from_millis(120));
        assert!(out.next_frame().is_none());
    }

    #[test]
    fn cancel_is_idempotent() {
        let raw = FrameStream::new(32, 32, 8);
        let (_, mut pipeline) =
            CropPipeline::start(raw, Rectangle::new(0, 0, 10, 10), display(32, 32));
        pipeline.cancel();
        pipeline.cancel();
    }

    #[test]
    fn loop_exits_when_raw_stream_dies() {
        let raw = FrameStream::new(32, 32, 8);
        let (_out, mut pipeline) =
            CropPipeline::start(raw.clone(), Rectangle::new(0, 0, 10, 10), display(32, 32));

        raw.stop();
        // join must complete promptly once the source is gone
        pipeline.cancel();
    }
}
