//! # screen-capture-core
//!
//! Platform-agnostic screen capture core library.
//!
//! Provides the recording session state machine, live-frame cropping,
//! the multi-window coordination protocol, and the transient popup
//! timer. Platform backends (scap on Windows/macOS, others to come)
//! implement the `CaptureProvider` trait and plug into the generic
//! session; encoders and the gallery store plug in the same way.
//!
//! ## Architecture
//!
//! ```text
//! screen-capture-core (this crate)
//! ├── traits/        ← CaptureProvider, VideoEncoder, SessionDelegate, MediaStore
//! ├── models/        ← CaptureError, SessionState, CaptureRequest, geometry, results
//! ├── pipeline/      ← FrameStream, resolution policy, crop loop, Y4M encoder
//! ├── session/       ← stream acquisition, RecorderSession, SessionManager
//! ├── coordination/  ← window message protocol, overlay state, coordinator
//! ├── timing/        ← pause-aware transient timer
//! ├── sources        ← source selection policy
//! ├── screenshot     ← still capture
//! └── storage/       ← local media fetch for previews
//! ```

pub mod coordination;
pub mod models;
pub mod pipeline;
pub mod screenshot;
pub mod session;
pub mod sources;
pub mod storage;
pub mod timing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use coordination::coordinator::{RecordingCoordinator, WindowBus};
pub use coordination::messages::{CommandMessage, OverlayInit, OverlayMessage, OverlayMode, WindowRole};
pub use coordination::overlay::OverlayState;
pub use models::config::CaptureConfig;
pub use models::error::CaptureError;
pub use models::geometry::{DisplayInfo, PixelRect, Rectangle};
pub use models::recording_result::{
    CaptureMetadata, MediaFormat, RecordingPayload, RecordingStatus, StoredFile,
};
pub use models::request::{AudioOptions, CaptureMode, CaptureRequest, Quality};
pub use models::source::{CaptureSource, SourceKind};
pub use models::state::SessionState;
pub use pipeline::cropper::CropPipeline;
pub use pipeline::frame::{FrameQueue, FrameStream, VideoFrame};
pub use pipeline::y4m_encoder::Y4mEncoder;
pub use session::manager::SessionManager;
pub use session::recorder::RecorderSession;
pub use sources::SourceSelector;
pub use storage::media_probe::MediaFetch;
pub use timing::transient_timer::{TimerState, TransientTimer};
pub use traits::capture_provider::{CaptureProvider, StreamParams};
pub use traits::media_store::MediaStore;
pub use traits::session_delegate::{NullDelegate, SessionDelegate};
pub use traits::video_encoder::{EncodedChunk, EncoderConfig, VideoEncoder};
