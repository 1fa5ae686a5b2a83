use std::path::PathBuf;

use super::request::Quality;

/// Application-level capture configuration.
///
/// One instance per process, handed to the coordinator at construction.
/// Per-capture knobs live on `CaptureRequest` instead.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// The host application's own window name. Window sources matching it
    /// (case-insensitive substring) are hidden from the picker so the app
    /// cannot record itself.
    pub app_window_name: String,

    /// Countdown shown before recording starts, in seconds. Zero skips
    /// the countdown entirely.
    pub countdown_secs: u32,

    /// Quality used when a request does not specify one.
    pub default_quality: Quality,

    /// Requested capture frame-rate range.
    pub min_frame_rate: u32,
    pub max_frame_rate: u32,

    /// Whether the cursor is included in captured frames.
    pub show_cursor: bool,

    /// Directory the gallery store writes into.
    pub output_directory: PathBuf,

    /// How long the post-capture preview popup stays open unfocused, in
    /// milliseconds. Focusing the popup suspends the countdown.
    pub preview_close_delay_ms: u64,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_frame_rate == 0 || self.min_frame_rate > self.max_frame_rate {
            return Err(format!(
                "invalid frame-rate range: {}..{}",
                self.min_frame_rate, self.max_frame_rate
            ));
        }
        if self.countdown_secs > 60 {
            return Err(format!("countdown too long: {}s", self.countdown_secs));
        }
        if self.preview_close_delay_ms == 0 {
            return Err("preview close delay must be positive".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            app_window_name: "Screen Capture".into(),
            countdown_secs: 3,
            default_quality: Quality::Medium,
            min_frame_rate: 30,
            max_frame_rate: 60,
            show_cursor: true,
            output_directory: PathBuf::from("."),
            preview_close_delay_ms: 5_000,
        }
    }
}
