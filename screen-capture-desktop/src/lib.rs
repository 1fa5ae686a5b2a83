//! # screen-capture-desktop
//!
//! Desktop backend for screen-capture-kit.
//!
//! Provides:
//! - `ScapProvider` — screen/window enumeration and live capture via `scap`
//! - `permissions` — OS screen-recording permission probe
//! - `FfmpegEncoder` — WebM/VP9 encoding through an `ffmpeg` subprocess
//! - `FsMediaStore` — gallery directory persistence with metadata sidecars
//!
//! The scap-backed capture path is available on Windows and macOS; the
//! encoder and store are platform-independent.
//!
//! ## Usage
//! ```ignore
//! use screen_capture_core::{CaptureConfig, SessionManager, MediaFormat, RecordingCoordinator};
//! use screen_capture_desktop::{FfmpegEncoder, FsMediaStore, ScapProvider};
//!
//! let provider = Arc::new(ScapProvider::new());
//! let manager = Arc::new(SessionManager::new(provider, CaptureConfig::default()));
//! let store = Arc::new(FsMediaStore::new("gallery"));
//! let coordinator = RecordingCoordinator::new(
//!     manager,
//!     store,
//!     Box::new(|| Box::new(FfmpegEncoder::system())),
//!     MediaFormat::Webm,
//! );
//! ```

pub mod ffmpeg_encoder;
pub mod fs_store;

#[cfg(any(target_os = "windows", target_os = "macos"))]
pub mod permissions;
#[cfg(any(target_os = "windows", target_os = "macos"))]
pub mod scap_provider;

pub use ffmpeg_encoder::FfmpegEncoder;
pub use fs_store::FsMediaStore;
#[cfg(any(target_os = "windows", target_os = "macos"))]
pub use scap_provider::ScapProvider;
