//! The one-session arena.
//!
//! Exactly one recording may be live process-wide. The manager owns that
//! slot: starting a new session disposes the prior one completely —
//! tracks stopped, threads joined — before the new acquisition begins,
//! so two sessions can never hold capture hardware at once.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::geometry::DisplayInfo;
use crate::models::recording_result::{RecordingPayload, RecordingStatus};
use crate::models::request::CaptureRequest;
use crate::models::state::SessionState;
use crate::session::recorder::RecorderSession;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::video_encoder::VideoEncoder;

pub struct SessionManager {
    provider: Arc<dyn CaptureProvider>,
    config: CaptureConfig,
    active: Mutex<Option<RecorderSession>>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn CaptureProvider>, config: CaptureConfig) -> Self {
        Self {
            provider,
            config,
            active: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn CaptureProvider> {
        &self.provider
    }

    /// Start a recording, replacing and disposing any active session
    /// first (last start wins; starts are never queued).
    pub fn start(
        &self,
        request: CaptureRequest,
        display: DisplayInfo,
        encoder: Box<dyn VideoEncoder>,
        delegate: Arc<dyn SessionDelegate>,
    ) -> Result<(), CaptureError> {
        let mut slot = self.active.lock();
        if let Some(mut prior) = slot.take() {
            log::info!("replacing active session");
            prior.cleanup();
        }

        let session = RecorderSession::start(
            self.provider.as_ref(),
            request,
            display,
            &self.config,
            encoder,
            delegate,
        )?;
        *slot = Some(session);
        Ok(())
    }

    /// Forward a pause; stale when nothing records.
    pub fn pause(&self) {
        if let Some(session) = self.active.lock().as_ref() {
            session.pause();
        }
    }

    /// Forward a resume; stale when nothing records.
    pub fn resume(&self) {
        if let Some(session) = self.active.lock().as_ref() {
            session.resume();
        }
    }

    /// Stop the active session and hand back its payload.
    ///
    /// `Ok(None)` when nothing was recording. The session slot is empty
    /// afterwards whether the stop succeeded or failed.
    pub fn stop(&self) -> Result<Option<RecordingPayload>, CaptureError> {
        let mut slot = self.active.lock();
        let Some(mut session) = slot.take() else {
            log::debug!("ignoring stop with no active session");
            return Ok(None);
        };
        session.stop()
    }

    /// Dispose the active session without producing a payload.
    pub fn abort(&self) {
        if let Some(mut session) = self.active.lock().take() {
            log::info!("aborting active session");
            session.cleanup();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .map(|s| s.state().is_active())
            .unwrap_or(false)
    }

    pub fn state(&self) -> SessionState {
        self.active
            .lock()
            .as_ref()
            .map(|s| s.state())
            .unwrap_or(SessionState::Idle)
    }

    pub fn status(&self) -> RecordingStatus {
        self.active
            .lock()
            .as_ref()
            .map(|s| s.status())
            .unwrap_or_else(RecordingStatus::idle)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::models::request::{AudioOptions, CaptureMode, Quality};
    use crate::session::testing::{FakeEncoder, FakeProvider};
    use crate::traits::session_delegate::NullDelegate;

    fn display() -> DisplayInfo {
        DisplayInfo { width: 1280, height: 720, scale_factor: 1.0 }
    }

    fn request() -> CaptureRequest {
        CaptureRequest {
            mode: CaptureMode::FullScreen,
            source_id: "screen:0".into(),
            area: None,
            audio: AudioOptions::default(),
            quality: Quality::High,
        }
    }

    fn manager() -> (Arc<FakeProvider>, SessionManager) {
        let provider = Arc::new(FakeProvider::new());
        let manager = SessionManager::new(provider.clone(), CaptureConfig::default());
        (provider, manager)
    }

    fn start(manager: &SessionManager) {
        manager
            .start(
                request(),
                display(),
                Box::new(FakeEncoder::empty()),
                Arc::new(NullDelegate),
            )
            .unwrap();
    }

    #[test]
    fn starting_replaces_and_disposes_the_prior_session() {
        let (provider, manager) = manager();

        start(&manager);
        assert_eq!(provider.live_count(), 1);

        start(&manager);
        assert_eq!(provider.live_count(), 1);
        assert_eq!(provider.open_calls.load(Ordering::SeqCst), 2);

        // The prior session's tracks were released before the second
        // acquisition; two live track sets never coexisted.
        assert!(!provider.observed_overlap.load(Ordering::SeqCst));
    }

    #[test]
    fn stop_empties_the_slot_and_releases_tracks() {
        let (provider, manager) = manager();
        start(&manager);

        let payload = manager.stop().unwrap();
        assert!(payload.is_some());
        assert!(!manager.is_active());
        assert_eq!(provider.live_count(), 0);

        // Stale second stop.
        assert!(manager.stop().unwrap().is_none());
    }

    #[test]
    fn commands_without_a_session_are_swallowed() {
        let (_, manager) = manager();
        manager.pause();
        manager.resume();
        assert!(manager.stop().unwrap().is_none());
        assert_eq!(manager.state(), SessionState::Idle);
    }

    #[test]
    fn status_reflects_the_active_session() {
        let (_, manager) = manager();
        assert!(!manager.status().is_recording);

        start(&manager);
        assert!(manager.status().is_recording);

        manager.pause();
        assert!(manager.status().is_paused);
        manager.resume();
        assert!(!manager.status().is_paused);

        manager.stop().unwrap();
        assert!(!manager.status().is_recording);
    }

    #[test]
    fn abort_releases_without_payload() {
        let (provider, manager) = manager();
        start(&manager);

        manager.abort();
        assert_eq!(provider.live_count(), 0);
        assert!(!manager.is_active());
    }

    #[test]
    fn failed_start_leaves_the_slot_empty() {
        let provider = Arc::new({
            let mut p = FakeProvider::new();
            p.fail_open = true;
            p
        });
        let manager = SessionManager::new(provider, CaptureConfig::default());

        let result = manager.start(
            request(),
            display(),
            Box::new(FakeEncoder::empty()),
            Arc::new(NullDelegate),
        );
        assert!(result.is_err());
        assert!(!manager.is_active());
    }
}
