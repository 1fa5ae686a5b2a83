//! Frames and live frame streams.
//!
//! A `FrameStream` is the unit of ownership for capture output: the
//! backend's capture thread pushes decoded frames in on one side, exactly
//! one session consumes them on the other, and `stop()` releases the
//! producer. The queue between the two drops oldest on overflow so a
//! stalled consumer costs bounded memory, never unbounded growth.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Bytes per pixel of the BGRA frames every backend delivers.
pub const BYTES_PER_PIXEL: usize = 4;

/// One decoded BGRA frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: u64,
}

impl VideoFrame {
    /// Expected buffer length for a `width` × `height` BGRA frame.
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * BYTES_PER_PIXEL
    }

    /// Whether the buffer length matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == Self::expected_len(self.width, self.height)
    }
}

/// Bounded queue of frames between a capture thread and its consumer.
///
/// Overflow drops the oldest frame: for live video the newest picture is
/// always the most valuable one.
#[derive(Debug)]
pub struct FrameQueue {
    frames: VecDeque<VideoFrame>,
    capacity: usize,
    dropped: u64,
}

impl FrameQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn push(&mut self, frame: VideoFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
            self.dropped += 1;
        }
        self.frames.push_back(frame);
    }

    /// Remove and return the oldest frame.
    pub fn pop(&mut self) -> Option<VideoFrame> {
        self.frames.pop_front()
    }

    /// Discard everything queued and return only the newest frame.
    pub fn take_latest(&mut self) -> Option<VideoFrame> {
        let latest = self.frames.pop_back();
        self.frames.clear();
        latest
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames discarded to overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Handle to a live stream of frames with negotiated dimensions.
///
/// Cloning shares the underlying queue and liveness flag, so producer and
/// consumer sides hold the same stream. `stop()` is the track-release
/// point: after it, pushes are refused and the producer thread winds down
/// on its next liveness check.
#[derive(Debug, Clone)]
pub struct FrameStream {
    width: u32,
    height: u32,
    queue: Arc<Mutex<FrameQueue>>,
    live: Arc<AtomicBool>,
}

impl FrameStream {
    pub fn new(width: u32, height: u32, queue_capacity: usize) -> Self {
        Self {
            width,
            height,
            queue: Arc::new(Mutex::new(FrameQueue::new(queue_capacity))),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Negotiated (reported) width of this stream.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Negotiated (reported) height of this stream.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Push a frame from the producer side. Returns `false` once the
    /// stream has been stopped, telling the producer to wind down.
    pub fn push(&self, frame: VideoFrame) -> bool {
        if !self.is_live() {
            return false;
        }
        self.queue.lock().push(frame);
        true
    }

    /// Oldest queued frame, in delivery order.
    pub fn next_frame(&self) -> Option<VideoFrame> {
        self.queue.lock().pop()
    }

    /// Newest queued frame, discarding anything older.
    pub fn latest_frame(&self) -> Option<VideoFrame> {
        self.queue.lock().take_latest()
    }

    /// Drop all queued frames without consuming them.
    pub fn discard_queued(&self) {
        self.queue.lock().clear();
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop every track of this stream: refuse further frames, release
    /// the producer, and drop whatever was still queued. Idempotent.
    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
        self.queue.lock().clear();
    }
}
