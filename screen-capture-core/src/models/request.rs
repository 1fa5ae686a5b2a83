use serde::{Deserialize, Serialize};

use super::error::CaptureError;
use super::geometry::Rectangle;

/// Smallest selectable edge, in logical pixels. Drags below this in either
/// dimension are accidental and never reach the capture backend.
pub const MIN_AREA_EDGE: u32 = 10;

/// How the capture source is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    FullScreen,
    Window,
    Area,
}

/// Named cap bounding recorded pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
}

/// Audio capture options.
///
/// Carried on requests for forward compatibility, but the stream acquirer
/// never requests audio; see `session::acquire`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioOptions {
    pub enabled: bool,
}

/// A validated, immutable description of one capture.
///
/// Built once from UI input and never mutated afterwards; quality is read
/// at session start only, so settings changes apply to the next capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub mode: CaptureMode,
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub area: Option<Rectangle>,
    #[serde(default)]
    pub audio: AudioOptions,
    pub quality: Quality,
}

impl CaptureRequest {
    /// Check the request before any stream is acquired.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.mode == CaptureMode::Area && self.area.is_none() {
            return Err(CaptureError::InvalidSelection);
        }
        if let Some(area) = &self.area {
            if area.width < MIN_AREA_EDGE || area.height < MIN_AREA_EDGE {
                return Err(CaptureError::InvalidSelection);
            }
        }
        if self.source_id.is_empty() {
            return Err(CaptureError::SourceUnavailable("no source selected".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(area: Option<Rectangle>) -> CaptureRequest {
        CaptureRequest {
            mode: if area.is_some() { CaptureMode::Area } else { CaptureMode::FullScreen },
            source_id: "screen:0".into(),
            area,
            audio: AudioOptions::default(),
            quality: Quality::Medium,
        }
    }

    #[test]
    fn full_screen_request_is_valid() {
        assert!(request(None).validate().is_ok());
    }

    #[test]
    fn area_request_is_valid_at_threshold() {
        let req = request(Some(Rectangle::new(0, 0, MIN_AREA_EDGE, MIN_AREA_EDGE)));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn undersized_width_is_rejected() {
        let req = request(Some(Rectangle::new(0, 0, MIN_AREA_EDGE - 1, 500)));
        assert_eq!(req.validate(), Err(CaptureError::InvalidSelection));
    }

    #[test]
    fn undersized_height_is_rejected() {
        let req = request(Some(Rectangle::new(0, 0, 500, 3)));
        assert_eq!(req.validate(), Err(CaptureError::InvalidSelection));
    }

    #[test]
    fn area_mode_without_area_is_rejected() {
        let mut req = request(None);
        req.mode = CaptureMode::Area;
        assert_eq!(req.validate(), Err(CaptureError::InvalidSelection));
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut req = request(None);
        req.source_id.clear();
        assert!(matches!(
            req.validate(),
            Err(CaptureError::SourceUnavailable(_))
        ));
    }
}
