//! Cross-window recording coordination.
//!
//! One coordinator sequences the independent windows — countdown popup,
//! area border, recording pill, dashboard — so they present a single
//! logical recording. Windows attach a channel per role; everything they
//! learn arrives as an [`OverlayMessage`] copy, and everything they want
//! done comes back as a [`CommandMessage`].
//!
//! The countdown is window-local: the coordinator pushes one init
//! message, each overlay ticks by itself, and only the zero crossing
//! (or Escape) travels back here.

use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::coordination::messages::{
    CommandMessage, OverlayInit, OverlayMessage, OverlayMode, WindowRole,
};
use crate::models::error::CaptureError;
use crate::models::geometry::{DisplayInfo, Rectangle};
use crate::models::recording_result::{
    MediaFormat, RecordingPayload, RecordingStatus, StoredFile,
};
use crate::models::request::{AudioOptions, CaptureMode, CaptureRequest, Quality};
use crate::models::state::SessionState;
use crate::screenshot;
use crate::session::manager::SessionManager;
use crate::traits::media_store::MediaStore;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::video_encoder::VideoEncoder;

/// Produces a fresh encoder per recording.
pub type EncoderFactory = Box<dyn Fn() -> Box<dyn VideoEncoder> + Send + Sync>;

/// Registry of per-window outgoing channels.
///
/// Sends are fire-and-forget; a window whose receiver is gone is
/// silently dropped from the registry on the next send to it.
pub struct WindowBus {
    windows: Mutex<HashMap<WindowRole, Sender<OverlayMessage>>>,
}

impl WindowBus {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, role: WindowRole, sender: Sender<OverlayMessage>) {
        self.windows.lock().insert(role, sender);
    }

    pub fn unregister(&self, role: WindowRole) {
        self.windows.lock().remove(&role);
    }

    pub fn send_to(&self, role: WindowRole, message: OverlayMessage) {
        let mut windows = self.windows.lock();
        if let Some(sender) = windows.get(&role) {
            if sender.send(message).is_err() {
                log::debug!("window {:?} is gone; dropping it from the bus", role);
                windows.remove(&role);
            }
        }
    }

    pub fn broadcast(&self, message: OverlayMessage) {
        self.windows
            .lock()
            .retain(|role, sender| match sender.send(message.clone()) {
                Ok(()) => true,
                Err(_) => {
                    log::debug!("window {:?} is gone; dropping it from the bus", role);
                    false
                }
            });
    }
}

impl Default for WindowBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Session delegate that fans status out over the window bus.
///
/// Failure ordering matters: the session releases its streams before
/// calling `on_error`, and the first thing broadcast afterwards is an
/// idle status so no window is left showing a stuck recording indicator.
struct BusDelegate {
    bus: Arc<WindowBus>,
}

impl SessionDelegate for BusDelegate {
    fn on_state_changed(&self, state: &SessionState) {
        log::debug!("session state: {:?}", state);
    }

    fn on_status(&self, status: &RecordingStatus) {
        self.bus.broadcast(OverlayMessage::Status(*status));
    }

    fn on_error(&self, error: &CaptureError) {
        self.bus.broadcast(OverlayMessage::Status(RecordingStatus::idle()));
        self.bus.broadcast(OverlayMessage::Failed {
            message: error.to_string(),
        });
    }

    fn on_finished(&self, _payload: &RecordingPayload) {}
}

/// A request parked while its countdown runs.
struct PendingCapture {
    request: CaptureRequest,
    display: DisplayInfo,
}

pub struct RecordingCoordinator {
    manager: Arc<SessionManager>,
    store: Arc<dyn MediaStore>,
    bus: Arc<WindowBus>,
    encoder_factory: EncoderFactory,
    video_format: MediaFormat,
    display: Mutex<DisplayInfo>,
    pending: Mutex<Option<PendingCapture>>,
}

impl RecordingCoordinator {
    pub fn new(
        manager: Arc<SessionManager>,
        store: Arc<dyn MediaStore>,
        encoder_factory: EncoderFactory,
        video_format: MediaFormat,
    ) -> Self {
        Self {
            manager,
            store,
            bus: Arc::new(WindowBus::new()),
            encoder_factory,
            video_format,
            display: Mutex::new(DisplayInfo {
                width: 1920,
                height: 1080,
                scale_factor: 1.0,
            }),
            pending: Mutex::new(None),
        }
    }

    /// The bus windows register their channels on.
    pub fn bus(&self) -> Arc<WindowBus> {
        Arc::clone(&self.bus)
    }

    /// Record which display the next capture targets.
    pub fn set_display(&self, display: DisplayInfo) {
        *self.display.lock() = display;
    }

    /// Entry point for every command a window can send.
    ///
    /// Commands may arrive duplicated or out of order; anything that no
    /// longer applies is swallowed, not errored.
    pub fn handle_command(&self, command: CommandMessage) -> Result<(), CaptureError> {
        match command {
            CommandMessage::StartRecording {
                mode,
                source_id,
                area,
                audio,
                quality,
            } => self.begin_capture_flow(CaptureRequest {
                mode,
                source_id,
                area,
                audio,
                quality,
            }),
            CommandMessage::StartScreenshot { mode, area } => self.take_screenshot(mode, area),
            CommandMessage::StopRecording => self.stop_recording().map(|_| ()),
            CommandMessage::PauseRecording => {
                self.manager.pause();
                self.bus
                    .broadcast(OverlayMessage::Status(self.manager.status()));
                Ok(())
            }
            CommandMessage::ResumeRecording => {
                self.manager.resume();
                self.bus
                    .broadcast(OverlayMessage::Status(self.manager.status()));
                Ok(())
            }
            CommandMessage::CountdownComplete => self.countdown_complete(),
            CommandMessage::CountdownCancel => {
                self.countdown_cancel();
                Ok(())
            }
        }
    }

    /// Park the request and kick off the countdown presentation.
    fn begin_capture_flow(&self, request: CaptureRequest) -> Result<(), CaptureError> {
        match request.validate() {
            Err(CaptureError::InvalidSelection) => {
                // Sub-threshold drags are accidents: no capture, no error.
                log::debug!("ignoring undersized selection {:?}", request.area);
                return Ok(());
            }
            Err(e) => return Err(e),
            Ok(()) => {}
        }

        let display = *self.display.lock();
        let countdown_secs = self.manager.config().countdown_secs;
        let area = request.area;

        *self.pending.lock() = Some(PendingCapture { request, display });

        if countdown_secs == 0 {
            return self.countdown_complete();
        }

        let init = OverlayInit {
            mode: OverlayMode::Countdown,
            countdown_secs,
            area,
            screen_bounds: Some(Rectangle::new(0, 0, display.width, display.height)),
            display,
        };
        self.bus
            .send_to(WindowRole::CountdownOverlay, OverlayMessage::Init(init.clone()));
        if let Some(area) = area {
            self.bus
                .send_to(WindowRole::AreaBorder, OverlayMessage::Init(init));
            self.bus
                .send_to(WindowRole::AreaBorder, OverlayMessage::AreaBorder { area });
        }
        Ok(())
    }

    /// An overlay finished its countdown: flip it to recording mode and
    /// start the session proper.
    fn countdown_complete(&self) -> Result<(), CaptureError> {
        let Some(pending) = self.pending.lock().take() else {
            log::debug!("ignoring countdown completion with nothing pending");
            return Ok(());
        };

        self.bus.send_to(
            WindowRole::CountdownOverlay,
            OverlayMessage::SwitchMode { mode: OverlayMode::Recording },
        );
        self.bus.send_to(
            WindowRole::AreaBorder,
            OverlayMessage::SwitchMode { mode: OverlayMode::Recording },
        );

        let delegate = Arc::new(BusDelegate { bus: Arc::clone(&self.bus) });
        let encoder = (self.encoder_factory)();

        match self
            .manager
            .start(pending.request, pending.display, encoder, delegate)
        {
            Ok(()) => {
                self.bus
                    .broadcast(OverlayMessage::Status(self.manager.status()));
                Ok(())
            }
            Err(e) => {
                // The session never came up; make sure nothing keeps
                // showing "recording".
                self.bus
                    .broadcast(OverlayMessage::Status(RecordingStatus::idle()));
                self.bus.broadcast(OverlayMessage::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Escape during the countdown: discard the parked request before
    /// any stream was acquired.
    fn countdown_cancel(&self) {
        if self.pending.lock().take().is_some() {
            self.bus.broadcast(OverlayMessage::CountdownCancelled);
        } else {
            log::debug!("ignoring countdown cancel with nothing pending");
        }
    }

    /// Stop the active recording and hand the payload to persistence.
    pub fn stop_recording(&self) -> Result<Option<StoredFile>, CaptureError> {
        let payload = match self.manager.stop() {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.bus
                    .broadcast(OverlayMessage::Status(RecordingStatus::idle()));
                self.bus.broadcast(OverlayMessage::Failed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        self.bus
            .broadcast(OverlayMessage::Status(RecordingStatus::idle()));

        match self.store.store(&payload, self.video_format) {
            Ok(stored) => {
                log::info!("recording saved: {} ({} bytes)", stored.filename, stored.size);
                self.bus.broadcast(OverlayMessage::Saved(stored.clone()));
                Ok(Some(stored))
            }
            Err(e) => {
                log::error!("failed to persist recording: {}", e);
                self.bus.broadcast(OverlayMessage::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn take_screenshot(
        &self,
        mode: CaptureMode,
        area: Option<Rectangle>,
    ) -> Result<(), CaptureError> {
        let display = *self.display.lock();
        let config = self.manager.config();

        let source_id = match screenshot::primary_screen_id(self.manager.provider().as_ref()) {
            Ok(id) => id,
            Err(e) => {
                self.bus.broadcast(OverlayMessage::Failed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let request = CaptureRequest {
            mode,
            source_id,
            area,
            audio: AudioOptions::default(),
            quality: Quality::High,
        };
        if let Err(CaptureError::InvalidSelection) = request.validate() {
            log::debug!("ignoring undersized selection {:?}", area);
            return Ok(());
        }

        let shot = match screenshot::capture_screenshot(
            self.manager.provider().as_ref(),
            &request,
            &display,
            config,
        ) {
            Ok(shot) => shot,
            Err(e) => {
                self.bus.broadcast(OverlayMessage::Failed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let payload = RecordingPayload {
            buffer: shot.png,
            width: shot.width,
            height: shot.height,
            duration_secs: 0.0,
        };
        match self.store.store(&payload, MediaFormat::Png) {
            Ok(stored) => {
                self.bus.broadcast(OverlayMessage::Saved(stored));
                Ok(())
            }
            Err(e) => {
                self.bus.broadcast(OverlayMessage::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
