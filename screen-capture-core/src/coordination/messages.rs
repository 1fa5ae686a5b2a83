//! The cross-window message protocol.
//!
//! Everything that crosses a window boundary is one of these values,
//! serialized whole — state is shared by copy and reconciled on the
//! receiving side, never by reference. Tags follow the wire names the
//! windows already speak (`start-recording`, `overlay-init`, ...).

use serde::{Deserialize, Serialize};

use crate::models::geometry::{DisplayInfo, Rectangle};
use crate::models::recording_result::{RecordingStatus, StoredFile};
use crate::models::request::{AudioOptions, CaptureMode, Quality};

/// The window surfaces the coordinator addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowRole {
    Dashboard,
    CountdownOverlay,
    AreaBorder,
    RecordingPill,
}

/// What an overlay window is currently presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayMode {
    Countdown,
    Recording,
}

/// Initial payload pushed to an overlay window when a capture flow
/// begins. Carries everything the window needs to run its countdown
/// locally; no further round-trip happens per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayInit {
    pub mode: OverlayMode,
    pub countdown_secs: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub area: Option<Rectangle>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub screen_bounds: Option<Rectangle>,
    pub display: DisplayInfo,
}

/// Commands flowing from any window into the capture core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum CommandMessage {
    StartScreenshot {
        mode: CaptureMode,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        area: Option<Rectangle>,
    },
    StartRecording {
        mode: CaptureMode,
        source_id: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        area: Option<Rectangle>,
        #[serde(default)]
        audio: AudioOptions,
        quality: Quality,
    },
    StopRecording,
    PauseRecording,
    ResumeRecording,
    /// An overlay's local countdown reached zero.
    CountdownComplete,
    /// Escape pressed during the countdown.
    CountdownCancel,
}

/// Status broadcast from the capture core to interested windows.
///
/// Every window applies these to its own copy of the overlay state and
/// decides for itself how to render; no window is authoritative over
/// another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum OverlayMessage {
    #[serde(rename = "overlay-init")]
    Init(OverlayInit),
    #[serde(rename = "overlay-switch-mode")]
    SwitchMode { mode: OverlayMode },
    #[serde(rename = "recording-status")]
    Status(RecordingStatus),
    #[serde(rename = "area-border-update")]
    AreaBorder { area: Rectangle },
    #[serde(rename = "countdown-cancel")]
    CountdownCancelled,
    #[serde(rename = "recording-saved")]
    Saved(StoredFile),
    #[serde(rename = "recording-failed")]
    Failed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_use_wire_tags() {
        let json = serde_json::to_string(&CommandMessage::StopRecording).unwrap();
        assert_eq!(json, r#"{"type":"stop-recording"}"#);

        let json = serde_json::to_string(&CommandMessage::StartRecording {
            mode: CaptureMode::Area,
            source_id: "screen:0".into(),
            area: Some(Rectangle::new(1, 2, 30, 40)),
            audio: AudioOptions::default(),
            quality: Quality::High,
        })
        .unwrap();
        assert!(json.contains(r#""type":"start-recording""#));
        assert!(json.contains(r#""sourceId":"screen:0""#));
    }

    #[test]
    fn overlay_init_round_trips_exactly() {
        let init = OverlayInit {
            mode: OverlayMode::Countdown,
            countdown_secs: 3,
            area: Some(Rectangle::new(-7, 42, 1279, 721)),
            screen_bounds: Some(Rectangle::new(0, 0, 2560, 1440)),
            display: DisplayInfo { width: 2560, height: 1440, scale_factor: 1.25 },
        };

        let json = serde_json::to_string(&OverlayMessage::Init(init.clone())).unwrap();
        let decoded: OverlayMessage = serde_json::from_str(&json).unwrap();

        // The receiving window reconstructs the rectangle and display
        // bounds bit-for-bit from the wire form.
        assert_eq!(decoded, OverlayMessage::Init(init));
    }

    #[test]
    fn status_message_round_trips() {
        let msg = OverlayMessage::Status(RecordingStatus {
            is_recording: true,
            is_paused: false,
            duration_secs: 12.5,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"recording-status""#));
        assert!(json.contains(r#""isRecording":true"#));
        assert_eq!(serde_json::from_str::<OverlayMessage>(&json).unwrap(), msg);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_string(&CommandMessage::StartScreenshot {
            mode: CaptureMode::FullScreen,
            area: None,
        })
        .unwrap();
        assert!(!json.contains("area"));
    }
}
