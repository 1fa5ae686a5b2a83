//! Capture backend over `scap`.
//!
//! Enumerates displays and windows as capture sources and pumps live
//! BGRA frames from a per-stream capture thread into a `FrameStream`.
//! The capturer is built inside its pump thread and never crosses
//! threads; stopping the stream winds the thread down and releases the
//! OS capture handle.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use scap::capturer::{Capturer, Options, Resolution};
use scap::frame::{Frame, FrameType};
use scap::Target;

use screen_capture_core::{
    CaptureError, CaptureSource, FrameStream, SourceKind, StreamParams, VideoFrame,
};
use screen_capture_core::traits::capture_provider::CaptureProvider;

const FRAME_QUEUE_CAPACITY: usize = 16;
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(15);
const OPEN_TIMEOUT: Duration = Duration::from_secs(20);

pub struct ScapProvider;

impl ScapProvider {
    pub fn new() -> Self {
        Self
    }

    fn target_name(target: &Target, index: usize) -> (String, SourceKind) {
        match target {
            Target::Display(display) => {
                let title = display.title.trim();
                let name = if title.is_empty() {
                    format!("Display {}", index + 1)
                } else {
                    title.to_string()
                };
                (name, SourceKind::Screen)
            }
            Target::Window(window) => (window.title.clone(), SourceKind::Window),
        }
    }
}

impl Default for ScapProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureProvider for ScapProvider {
    fn enumerate_sources(&self) -> Result<Vec<CaptureSource>, CaptureError> {
        if !scap::is_supported() {
            return Err(CaptureError::SourceUnavailable(
                "screen capture not supported on this platform".into(),
            ));
        }

        let sources = scap::get_all_targets()
            .iter()
            .enumerate()
            .filter_map(|(index, target)| {
                let (name, kind) = Self::target_name(target, index);
                // Unnamed windows are background surfaces, not pickable.
                if kind == SourceKind::Window && name.trim().is_empty() {
                    return None;
                }
                let prefix = match kind {
                    SourceKind::Screen => "screen",
                    SourceKind::Window => "window",
                };
                Some(CaptureSource {
                    id: format!("{}:{}", prefix, index),
                    name,
                    thumbnail: None,
                    kind,
                })
            })
            .collect();
        Ok(sources)
    }

    fn open_stream(
        &self,
        source_id: &str,
        params: &StreamParams,
    ) -> Result<FrameStream, CaptureError> {
        if !scap::is_supported() {
            return Err(CaptureError::SourceUnavailable(
                "screen capture not supported on this platform".into(),
            ));
        }
        if !scap::has_permission() {
            return Err(CaptureError::SourceUnavailable(
                "screen recording permission not granted".into(),
            ));
        }

        let index = parse_target_index(source_id)?;
        let params = *params;
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("capture-pump".into())
            .spawn(move || pump_frames(index, params, tx))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn capture thread: {}", e)))?;

        match rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CaptureError::Timeout),
        }
    }
}

/// "screen:3" / "window:7" → 3 / 7.
fn parse_target_index(source_id: &str) -> Result<usize, CaptureError> {
    source_id
        .rsplit(':')
        .next()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| CaptureError::SourceUnavailable(format!("malformed source id {source_id}")))
}

/// Capture-thread body: build the capturer, learn the negotiated size
/// from the first frame, then pump until the stream is stopped.
fn pump_frames(
    index: usize,
    params: StreamParams,
    ready: mpsc::Sender<Result<FrameStream, CaptureError>>,
) {
    let target = match scap::get_all_targets().into_iter().nth(index) {
        Some(target) => target,
        None => {
            let _ = ready.send(Err(CaptureError::SourceUnavailable(format!(
                "capture target {} disappeared",
                index
            ))));
            return;
        }
    };

    let options = Options {
        fps: params.max_frame_rate,
        target: Some(target),
        show_cursor: params.show_cursor,
        show_highlight: false,
        excluded_targets: None,
        output_type: FrameType::BGRAFrame,
        output_resolution: Resolution::Captured,
        ..Default::default()
    };

    let mut capturer = match Capturer::build(options) {
        Ok(capturer) => capturer,
        Err(e) => {
            let _ = ready.send(Err(CaptureError::SourceUnavailable(format!(
                "failed to create capturer: {:?}",
                e
            ))));
            return;
        }
    };
    capturer.start_capture();

    let (width, height, first) = match wait_for_first_frame(&mut capturer) {
        Ok(first) => first,
        Err(e) => {
            capturer.stop_capture();
            let _ = ready.send(Err(e));
            return;
        }
    };
    log::info!("capture negotiated at {}x{}", width, height);

    let stream = FrameStream::new(width, height, FRAME_QUEUE_CAPACITY);
    let producer = stream.clone();
    if ready.send(Ok(stream)).is_err() {
        // The opener gave up waiting; nothing to feed.
        capturer.stop_capture();
        return;
    }

    let started = Instant::now();
    let expected_len = VideoFrame::expected_len(width, height);
    let mut last_good = first;
    producer.push(VideoFrame {
        data: last_good.clone(),
        width,
        height,
        timestamp_ms: 0,
    });

    while producer.is_live() {
        match capturer.get_next_frame() {
            Ok(frame) => {
                let Some(data) = frame_bytes(frame) else {
                    continue;
                };
                // scap occasionally delivers empty frames; reuse the
                // previous picture instead of dropping a tick.
                let data = if data.len() == expected_len {
                    last_good = data;
                    last_good.clone()
                } else if data.is_empty() {
                    last_good.clone()
                } else {
                    log::warn!("frame size {} != expected {}", data.len(), expected_len);
                    continue;
                };

                let pushed = producer.push(VideoFrame {
                    data,
                    width,
                    height,
                    timestamp_ms: started.elapsed().as_millis() as u64,
                });
                if !pushed {
                    break;
                }
            }
            Err(e) => {
                log::warn!("frame capture error: {:?}", e);
                thread::sleep(Duration::from_millis(10));
            }
        }
    }

    capturer.stop_capture();
    log::debug!("capture pump finished");
}

fn wait_for_first_frame(capturer: &mut Capturer) -> Result<(u32, u32, Vec<u8>), CaptureError> {
    let start = Instant::now();
    while start.elapsed() < FIRST_FRAME_TIMEOUT {
        match capturer.get_next_frame() {
            Ok(frame) => {
                if let Some((width, height, data)) = frame_dims(frame) {
                    return Ok((width, height, data));
                }
            }
            Err(_) => thread::sleep(Duration::from_millis(20)),
        }
    }
    Err(CaptureError::Timeout)
}

/// Extract the pixel buffer from any 4-byte-per-pixel frame variant.
fn frame_bytes(frame: Frame) -> Option<Vec<u8>> {
    frame_dims(frame).map(|(_, _, data)| data)
}

fn frame_dims(frame: Frame) -> Option<(u32, u32, Vec<u8>)> {
    match frame {
        Frame::BGRA(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::BGRx(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::BGR0(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::RGBx(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::XBGR(f) => Some((f.width as u32, f.height as u32, f.data)),
        _ => None,
    }
}
