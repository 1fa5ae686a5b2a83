//! Overlay-window local state.
//!
//! Each overlay window holds its own `OverlayState`, seeded by the init
//! message and reconciled from every broadcast it receives afterwards.
//! The countdown ticks locally — one decrement per second of window-side
//! timer — so a busy coordinator can never make the numbers stutter;
//! only the zero crossing is reported back.

use crate::coordination::messages::{CommandMessage, OverlayInit, OverlayMessage, OverlayMode};
use crate::models::geometry::Rectangle;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub mode: OverlayMode,
    pub countdown_value: u32,
    pub duration_secs: f64,
    pub is_paused: bool,
    pub area: Option<Rectangle>,
    pub screen_bounds: Option<Rectangle>,
    pub cancelled: bool,
}

impl OverlayState {
    pub fn from_init(init: &OverlayInit) -> Self {
        Self {
            mode: init.mode,
            countdown_value: init.countdown_secs,
            duration_secs: 0.0,
            is_paused: false,
            area: init.area,
            screen_bounds: init.screen_bounds,
            cancelled: false,
        }
    }

    /// Fold one incoming broadcast into this window's copy.
    pub fn apply(&mut self, message: &OverlayMessage) {
        match message {
            OverlayMessage::Init(init) => *self = Self::from_init(init),
            OverlayMessage::SwitchMode { mode } => {
                self.mode = *mode;
                if *mode == OverlayMode::Recording {
                    self.countdown_value = 0;
                }
            }
            OverlayMessage::Status(status) => {
                self.duration_secs = status.duration_secs;
                self.is_paused = status.is_paused;
            }
            OverlayMessage::AreaBorder { area } => self.area = Some(*area),
            OverlayMessage::CountdownCancelled => self.cancelled = true,
            OverlayMessage::Saved(_) | OverlayMessage::Failed { .. } => {}
        }
    }

    /// One local countdown step.
    ///
    /// Returns the notification to send the coordinator when the
    /// countdown crosses zero; `None` otherwise (including when the
    /// countdown was cancelled or already finished).
    pub fn tick(&mut self) -> Option<CommandMessage> {
        if self.mode != OverlayMode::Countdown || self.cancelled || self.countdown_value == 0 {
            return None;
        }
        self.countdown_value -= 1;
        if self.countdown_value == 0 {
            return Some(CommandMessage::CountdownComplete);
        }
        None
    }
}
