//! Recording session lifecycle.
//!
//! A session owns exactly one raw stream, zero-or-one crop pipeline, and
//! one encoder. A collector thread pumps frames into the encoder and
//! cuts a chunk slice once per second; `stop` finalizes the encoder
//! exactly once and concatenates every chunk in arrival order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::geometry::DisplayInfo;
use crate::models::recording_result::{RecordingPayload, RecordingStatus};
use crate::models::request::CaptureRequest;
use crate::models::state::SessionState;
use crate::pipeline::crop;
use crate::pipeline::cropper::CropPipeline;
use crate::pipeline::frame::FrameStream;
use crate::pipeline::resolution;
use crate::session::acquire;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::video_encoder::{EncodedChunk, EncoderConfig, VideoEncoder};

/// How often the collector wakes to pump frames.
const COLLECT_POLL: Duration = Duration::from_millis(33);

/// Encoded chunk slice interval.
const CHUNK_INTERVAL: Duration = Duration::from_secs(1);

/// Mutable state shared with the collector thread.
struct SessionShared {
    state: SessionState,
    capture_start: Option<Instant>,
    paused_duration: Duration,
    last_pause_time: Option<Instant>,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            capture_start: None,
            paused_duration: Duration::ZERO,
            last_pause_time: None,
        }
    }

    /// Seconds spent actually recording, excluding paused stretches.
    fn elapsed_duration(&self) -> f64 {
        let Some(start) = self.capture_start else {
            return 0.0;
        };
        let mut paused = self.paused_duration;
        if let Some(pause_start) = self.last_pause_time {
            paused += pause_start.elapsed();
        }
        (start.elapsed() - paused.min(start.elapsed())).as_secs_f64()
    }
}

/// One recording, from `start` to `stop` or failure.
///
/// Construct via [`RecorderSession::start`]; the manager guarantees at
/// most one instance is live process-wide.
pub struct RecorderSession {
    shared: Arc<Mutex<SessionShared>>,
    delegate: Arc<dyn SessionDelegate>,
    raw_stream: Option<FrameStream>,
    record_stream: Option<FrameStream>,
    crop: Option<CropPipeline>,
    encoder: Arc<Mutex<Option<Box<dyn VideoEncoder>>>>,
    chunks: Arc<Mutex<Vec<EncodedChunk>>>,
    collector_running: Arc<AtomicBool>,
    collector: Option<thread::JoinHandle<()>>,
    report_width: u32,
    report_height: u32,
}

impl RecorderSession {
    /// Acquire a stream, wire up the optional crop pipeline and the
    /// encoder, and begin collecting.
    ///
    /// On any failure every partially-held resource is released before
    /// the error returns, so a failed start leaves nothing live.
    pub fn start(
        provider: &dyn CaptureProvider,
        request: CaptureRequest,
        display: DisplayInfo,
        config: &CaptureConfig,
        mut encoder: Box<dyn VideoEncoder>,
        delegate: Arc<dyn SessionDelegate>,
    ) -> Result<RecorderSession, CaptureError> {
        let raw = acquire::acquire(provider, &request, &display, config)?;

        // Wrap with the crop pipeline when an area was selected. The
        // encoder sees the scaled source-pixel size; the payload reports
        // the logical selection.
        let (record_stream, crop, encode_dims, report_dims) = match request.area {
            Some(area) => {
                let rect = crop::source_pixel_rect(&area, &display, raw.width());
                let (cropped, pipeline) = CropPipeline::start(raw.clone(), area, display);
                (
                    cropped,
                    Some(pipeline),
                    (rect.width, rect.height),
                    (area.width, area.height),
                )
            }
            None => {
                let dims = (raw.width(), raw.height());
                (raw.clone(), None, dims, dims)
            }
        };

        let encoder_config = EncoderConfig {
            width: encode_dims.0,
            height: encode_dims.1,
            frame_rate: resolution::PIPELINE_FRAME_RATE,
            bitrate_bps: resolution::bitrate_for_pixels(
                encode_dims.0 as u64 * encode_dims.1 as u64,
            ),
        };

        if let Err(e) = encoder.begin(&encoder_config) {
            log::error!("encoder failed to start: {}", e);
            if let Some(mut pipeline) = crop {
                pipeline.cancel();
            }
            record_stream.stop();
            raw.stop();
            return Err(e);
        }

        log::info!(
            "recording started: {}x{} @ {} bps",
            encoder_config.width,
            encoder_config.height,
            encoder_config.bitrate_bps
        );

        let shared = Arc::new(Mutex::new(SessionShared::new()));
        {
            let mut s = shared.lock();
            s.capture_start = Some(Instant::now());
            s.state = SessionState::Recording { duration_secs: 0.0 };
        }
        delegate.on_state_changed(&SessionState::Recording { duration_secs: 0.0 });

        let mut session = RecorderSession {
            shared,
            delegate,
            raw_stream: Some(raw),
            record_stream: Some(record_stream),
            crop,
            encoder: Arc::new(Mutex::new(Some(encoder))),
            chunks: Arc::new(Mutex::new(Vec::new())),
            collector_running: Arc::new(AtomicBool::new(true)),
            collector: None,
            report_width: report_dims.0,
            report_height: report_dims.1,
        };
        session.spawn_collector();
        Ok(session)
    }

    fn spawn_collector(&mut self) {
        let running = Arc::clone(&self.collector_running);
        let shared = Arc::clone(&self.shared);
        let encoder = Arc::clone(&self.encoder);
        let chunks = Arc::clone(&self.chunks);
        let delegate = Arc::clone(&self.delegate);
        let stream = self.record_stream.clone().expect("collector needs a stream");
        let raw = self.raw_stream.clone().expect("collector needs a raw stream");

        let handle = thread::Builder::new()
            .name("chunk-collector".into())
            .spawn(move || {
                let mut last_slice = Instant::now();

                while running.load(Ordering::SeqCst) {
                    thread::sleep(COLLECT_POLL);

                    let (recording, paused) = {
                        let s = shared.lock();
                        (s.state.is_recording(), s.state.is_paused())
                    };

                    let slice_due = last_slice.elapsed() >= CHUNK_INTERVAL;

                    if paused {
                        // Paused content never reaches the encoder.
                        stream.discard_queued();
                    } else if recording {
                        let mut failure: Option<CaptureError> = None;
                        {
                            let mut guard = encoder.lock();
                            let Some(enc) = guard.as_mut() else { continue };

                            while let Some(frame) = stream.next_frame() {
                                if let Err(e) = enc.push_frame(&frame) {
                                    failure = Some(e);
                                    break;
                                }
                            }

                            if failure.is_none() && slice_due {
                                match enc.poll_chunk() {
                                    Ok(Some(chunk)) => chunks.lock().push(chunk),
                                    Ok(None) => {}
                                    Err(e) => failure = Some(e),
                                }
                            }
                        }

                        if let Some(e) = failure {
                            // Release the tracks first, then broadcast: no
                            // leaked stream may survive a failure report.
                            log::error!("encoder failed mid-session: {}", e);
                            stream.stop();
                            raw.stop();
                            shared.lock().state = SessionState::Failed(e.clone());
                            delegate.on_state_changed(&SessionState::Failed(e.clone()));
                            delegate.on_error(&e);
                            break;
                        }

                        let duration = shared.lock().elapsed_duration();
                        let mut s = shared.lock();
                        if s.state.is_recording() {
                            s.state = SessionState::Recording { duration_secs: duration };
                        }
                    } else {
                        continue;
                    }

                    // Duration/pause status fans out once per slice, not
                    // once per poll.
                    if slice_due {
                        last_slice = Instant::now();
                        let s = shared.lock();
                        let status = RecordingStatus {
                            is_recording: s.state.is_active(),
                            is_paused: s.state.is_paused(),
                            duration_secs: s.elapsed_duration(),
                        };
                        drop(s);
                        delegate.on_status(&status);
                    }
                }
            })
            .expect("failed to spawn collector thread");

        self.collector = Some(handle);
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state.clone()
    }

    pub fn status(&self) -> RecordingStatus {
        let s = self.shared.lock();
        RecordingStatus {
            is_recording: s.state.is_active(),
            is_paused: s.state.is_paused(),
            duration_secs: s.elapsed_duration(),
        }
    }

    /// Pause recording. A no-op from any state but `Recording`, so late
    /// or duplicate IPC delivery stays harmless.
    pub fn pause(&self) {
        let mut s = self.shared.lock();
        let SessionState::Recording { duration_secs } = s.state.clone() else {
            log::debug!("ignoring pause in state {:?}", s.state);
            return;
        };
        s.last_pause_time = Some(Instant::now());
        s.state = SessionState::Paused { duration_secs };
        let state = s.state.clone();
        drop(s);
        self.delegate.on_state_changed(&state);
    }

    /// Resume recording. A no-op from any state but `Paused`.
    pub fn resume(&self) {
        let mut s = self.shared.lock();
        let SessionState::Paused { duration_secs } = s.state.clone() else {
            log::debug!("ignoring resume in state {:?}", s.state);
            return;
        };
        if let Some(pause_start) = s.last_pause_time.take() {
            s.paused_duration += pause_start.elapsed();
        }
        s.state = SessionState::Recording { duration_secs };
        let state = s.state.clone();
        drop(s);
        self.delegate.on_state_changed(&state);
    }

    /// Stop recording and assemble the payload.
    ///
    /// Returns `Ok(None)` when there is nothing to stop (stale command).
    /// The encoder is finalized exactly once; cleanup runs whether the
    /// finalize succeeds or fails. Zero captured chunks produce the
    /// explicit empty payload rather than an error.
    pub fn stop(&mut self) -> Result<Option<RecordingPayload>, CaptureError> {
        {
            let mut s = self.shared.lock();
            if !s.state.is_active() {
                log::debug!("ignoring stop in state {:?}", s.state);
                return Ok(None);
            }
            // A stop while paused closes out the pause bookkeeping.
            if let Some(pause_start) = s.last_pause_time.take() {
                s.paused_duration += pause_start.elapsed();
            }
            s.state = SessionState::Stopping;
        }
        self.delegate.on_state_changed(&SessionState::Stopping);

        self.collector_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.collector.take() {
            let _ = handle.join();
        }

        // Final flush: drain whatever the collector had not consumed,
        // cut the last partial slice, then finalize.
        let finalize = {
            let taken = self.encoder.lock().take();
            match taken {
                Some(mut enc) => {
                    if let Some(stream) = &self.record_stream {
                        while let Some(frame) = stream.next_frame() {
                            if let Err(e) = enc.push_frame(&frame) {
                                log::warn!("dropping frame during stop: {}", e);
                                break;
                            }
                        }
                    }
                    match enc.poll_chunk() {
                        Ok(Some(chunk)) => self.chunks.lock().push(chunk),
                        Ok(None) => {}
                        Err(e) => log::warn!("final slice failed: {}", e),
                    }
                    enc.finish()
                }
                None => Ok(Vec::new()),
            }
        };

        let trailing = match finalize {
            Ok(trailing) => trailing,
            Err(e) => {
                self.cleanup();
                self.shared.lock().state = SessionState::Failed(e.clone());
                self.delegate.on_state_changed(&SessionState::Failed(e.clone()));
                self.delegate.on_error(&e);
                return Err(e);
            }
        };
        self.chunks.lock().extend(trailing);

        let duration = self.shared.lock().elapsed_duration();
        let collected: Vec<EncodedChunk> = std::mem::take(&mut *self.chunks.lock());

        let payload = if collected.is_empty() {
            log::warn!("stop produced no chunks; reporting empty payload");
            RecordingPayload::empty(duration)
        } else {
            let mut buffer = Vec::with_capacity(collected.iter().map(EncodedChunk::len).sum());
            for chunk in collected {
                buffer.extend(chunk.data);
            }
            RecordingPayload {
                buffer,
                width: self.report_width,
                height: self.report_height,
                duration_secs: duration,
            }
        };

        self.cleanup();
        self.shared.lock().state = SessionState::Stopped;
        self.delegate.on_state_changed(&SessionState::Stopped);
        self.delegate.on_finished(&payload);

        Ok(Some(payload))
    }

    /// Release everything: the collector thread, the crop loop, and every
    /// track of both streams. Safe to call repeatedly and from any state.
    pub fn cleanup(&mut self) {
        self.collector_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.collector.take() {
            let _ = handle.join();
        }
        if let Some(mut pipeline) = self.crop.take() {
            pipeline.cancel();
        }
        if let Some(stream) = self.record_stream.take() {
            stream.stop();
        }
        if let Some(stream) = self.raw_stream.take() {
            stream.stop();
        }
        self.encoder.lock().take();
    }
}

impl Drop for RecorderSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}
