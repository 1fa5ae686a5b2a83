//! Capture source selection.
//!
//! Thin policy layer over the backend's enumeration: results are fetched
//! fresh on every call, the application's own windows are filtered out of
//! the picker, and enumeration failure degrades to an empty list instead
//! of surfacing an error to the UI.

use std::sync::Arc;

use crate::models::source::{CaptureSource, SourceKind};
use crate::traits::capture_provider::CaptureProvider;

pub struct SourceSelector {
    provider: Arc<dyn CaptureProvider>,
    app_window_name: String,
}

impl SourceSelector {
    pub fn new(provider: Arc<dyn CaptureProvider>, app_window_name: impl Into<String>) -> Self {
        Self {
            provider,
            app_window_name: app_window_name.into(),
        }
    }

    /// List capturable sources, never erroring.
    ///
    /// Window sources whose name contains the host app's window name
    /// (case-insensitive) are dropped so the picker cannot offer
    /// self-capture. Screens are never filtered.
    pub fn list_sources(&self) -> Vec<CaptureSource> {
        let sources = match self.provider.enumerate_sources() {
            Ok(sources) => sources,
            Err(e) => {
                log::error!("source enumeration failed: {}", e);
                return Vec::new();
            }
        };

        let own_name = self.app_window_name.to_lowercase();
        sources
            .into_iter()
            .filter(|source| {
                if source.kind != SourceKind::Window || own_name.is_empty() {
                    return true;
                }
                !source.name.to_lowercase().contains(&own_name)
            })
            .collect()
    }
}
