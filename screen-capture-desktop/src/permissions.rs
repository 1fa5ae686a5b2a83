//! Screen-recording permission probe.
//!
//! On macOS the first capture attempt triggers the system consent
//! dialog and fails until the user grants access under System Settings >
//! Privacy & Security > Screen Recording. Windows needs no per-app
//! consent for desktop capture. Either way, callers should check before
//! opening a stream so the failure can be explained instead of surfacing
//! as a dead capture.

/// Whether this platform supports screen capture at all.
pub fn is_supported() -> bool {
    scap::is_supported()
}

/// Whether screen recording is currently permitted.
pub fn has_permission() -> bool {
    scap::has_permission()
}

/// Ask the OS for permission (opens the consent dialog on macOS).
pub fn request_permission() -> bool {
    scap::request_permission()
}
