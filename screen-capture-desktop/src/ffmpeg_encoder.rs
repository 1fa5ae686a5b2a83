//! WebM encoding through an ffmpeg subprocess.
//!
//! Raw BGRA frames go in on stdin, VP9-in-WebM comes out on stdout. A
//! reader thread drains stdout continuously (ffmpeg stalls if its pipe
//! fills), and `poll_chunk` hands whatever has accumulated to the
//! session as the next chunk. stderr is discarded for the same
//! stall-avoidance reason.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use screen_capture_core::{CaptureError, EncodedChunk, EncoderConfig, VideoEncoder, VideoFrame};

pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    collected: Arc<Mutex<Vec<u8>>>,
    reader: Option<thread::JoinHandle<()>>,
    expected_frame_len: usize,
    skipped_frames: u64,
    finished: bool,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            child: None,
            stdin: None,
            collected: Arc::new(Mutex::new(Vec::new())),
            reader: None,
            expected_frame_len: 0,
            skipped_frames: 0,
            finished: false,
        }
    }

    /// Use whatever `ffmpeg` resolves to on PATH.
    pub fn system() -> Self {
        Self::new("ffmpeg")
    }

    /// Verify the binary exists and runs.
    pub fn check_available(&self) -> Result<(), CaptureError> {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                CaptureError::EncoderError(format!(
                    "ffmpeg failed to execute at {:?}: {}",
                    self.ffmpeg_path, e
                ))
            })?;
        Ok(())
    }

    /// Argument list for one encoding run.
    fn build_args(config: &EncoderConfig) -> Vec<String> {
        vec![
            "-y".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "bgra".into(),
            "-s".into(),
            format!("{}x{}", config.width, config.height),
            "-r".into(),
            config.frame_rate.to_string(),
            "-i".into(),
            "pipe:0".into(),
            "-c:v".into(),
            "libvpx-vp9".into(),
            "-b:v".into(),
            config.bitrate_bps.to_string(),
            // Real-time settings: the session feeds live frames and
            // cannot wait on lookahead.
            "-deadline".into(),
            "realtime".into(),
            "-cpu-used".into(),
            "8".into(),
            "-f".into(),
            "webm".into(),
            "pipe:1".into(),
        ]
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn begin(&mut self, config: &EncoderConfig) -> Result<(), CaptureError> {
        if self.child.is_some() {
            return Err(CaptureError::EncoderError("encoder already started".into()));
        }

        let args = Self::build_args(config);
        log::info!(
            "spawning ffmpeg: {}x{} @ {} fps, {} bps",
            config.width,
            config.height,
            config.frame_rate,
            config.bitrate_bps
        );

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                CaptureError::EncoderError(format!(
                    "failed to spawn ffmpeg at {:?}: {}",
                    self.ffmpeg_path, e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CaptureError::EncoderError("no stdin pipe to ffmpeg".into()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::EncoderError("no stdout pipe from ffmpeg".into()))?;

        let collected = Arc::clone(&self.collected);
        let reader = thread::Builder::new()
            .name("ffmpeg-reader".into())
            .spawn(move || {
                let mut buf = [0u8; 64 * 1024];
                loop {
                    match stdout.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => collected.lock().extend_from_slice(&buf[..n]),
                        Err(e) => {
                            log::warn!("ffmpeg stdout read failed: {}", e);
                            break;
                        }
                    }
                }
            })
            .expect("failed to spawn ffmpeg reader thread");

        self.expected_frame_len = VideoFrame::expected_len(config.width, config.height);
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.reader = Some(reader);
        Ok(())
    }

    fn push_frame(&mut self, frame: &VideoFrame) -> Result<(), CaptureError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CaptureError::EncoderError("encoder not started".into()))?;

        // A frame of the wrong size would desync every frame after it.
        if frame.data.len() != self.expected_frame_len {
            self.skipped_frames += 1;
            if self.skipped_frames <= 3 {
                log::warn!(
                    "skipping frame: {} bytes, expected {}",
                    frame.data.len(),
                    self.expected_frame_len
                );
            }
            return Ok(());
        }

        stdin
            .write_all(&frame.data)
            .map_err(|e| CaptureError::EncoderError(format!("ffmpeg rejected frame: {}", e)))
    }

    fn poll_chunk(&mut self) -> Result<Option<EncodedChunk>, CaptureError> {
        let mut collected = self.collected.lock();
        if collected.is_empty() {
            return Ok(None);
        }
        Ok(Some(EncodedChunk {
            data: std::mem::take(&mut *collected),
        }))
    }

    fn finish(&mut self) -> Result<Vec<EncodedChunk>, CaptureError> {
        if self.finished {
            return Err(CaptureError::EncoderError("encoder already finalized".into()));
        }
        self.finished = true;

        // EOF on stdin tells ffmpeg to flush and write the trailer.
        drop(self.stdin.take());

        let mut child = self
            .child
            .take()
            .ok_or_else(|| CaptureError::EncoderError("encoder not started".into()))?;
        let status = child
            .wait()
            .map_err(|e| CaptureError::EncoderError(format!("failed to wait for ffmpeg: {}", e)))?;

        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }

        if !status.success() {
            return Err(CaptureError::EncoderError(format!(
                "ffmpeg exited with {:?}",
                status.code()
            )));
        }

        if self.skipped_frames > 0 {
            log::warn!("skipped {} mis-sized frames total", self.skipped_frames);
        }

        let mut collected = self.collected.lock();
        if collected.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![EncodedChunk {
            data: std::mem::take(&mut *collected),
        }])
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}
