//! Capture resolution and bitrate policy.
//!
//! Pure arithmetic shared by the stream acquirer and the crop pipeline:
//! quality caps, even-dimension fix-up for the encoder, and the bitrate
//! ladder stepped by pixel count.

use crate::models::geometry::DisplayInfo;
use crate::models::request::Quality;

/// Requested capture frame-rate range.
pub const MIN_FRAME_RATE: u32 = 30;
pub const MAX_FRAME_RATE: u32 = 60;

/// Frame rate of the crop pipeline's redraw loop and the default encoder.
pub const PIPELINE_FRAME_RATE: u32 = 30;

const PIXELS_720P: u64 = 1280 * 720;
const PIXELS_1080P: u64 = 1920 * 1080;
const PIXELS_1440P: u64 = 2560 * 1440;
const PIXELS_4K: u64 = 3840 * 2160;

/// Maximum capture dimensions for a quality preset; `None` is uncapped.
pub fn quality_cap(quality: Quality) -> Option<(u32, u32)> {
    match quality {
        Quality::Low => Some((1280, 720)),
        Quality::Medium => Some((1920, 1080)),
        Quality::High => None,
    }
}

/// Compute the pixel dimensions to request from the capture backend.
///
/// Native pixels = logical size × scale factor; if those exceed the
/// quality cap they are downscaled preserving aspect ratio. Both final
/// dimensions are forced even, which the encoder requires.
pub fn capture_dimensions(display: &DisplayInfo, quality: Quality) -> (u32, u32) {
    let (native_w, native_h) = display.native_pixel_size();
    let (w, h) = match quality_cap(quality) {
        Some((cap_w, cap_h)) if native_w > cap_w || native_h > cap_h => {
            let scale = f64::min(
                cap_w as f64 / native_w as f64,
                cap_h as f64 / native_h as f64,
            );
            (
                ((native_w as f64) * scale).round() as u32,
                ((native_h as f64) * scale).round() as u32,
            )
        }
        _ => (native_w, native_h),
    };
    (force_even(w), force_even(h))
}

/// Round down to the nearest even value, with a floor of 2.
pub fn force_even(dim: u32) -> u32 {
    (dim & !1).max(2)
}

/// Ratio between what the backend actually negotiated and the display's
/// native pixel width. The stream itself may have been downscaled by the
/// quality cap, so logical→source-pixel mapping must fold this in.
pub fn capture_scale(negotiated_width: u32, native_width: u32) -> f64 {
    if native_width == 0 {
        return 1.0;
    }
    negotiated_width as f64 / native_width as f64
}

/// Encoder bitrate stepped at the ≥720p/1080p/1440p/4K pixel counts.
pub fn bitrate_for_pixels(pixels: u64) -> u64 {
    if pixels >= PIXELS_4K {
        20_000_000
    } else if pixels >= PIXELS_1440P {
        12_000_000
    } else if pixels >= PIXELS_1080P {
        8_000_000
    } else if pixels >= PIXELS_720P {
        5_000_000
    } else {
        2_500_000
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn display(width: u32, height: u32, scale_factor: f64) -> DisplayInfo {
        DisplayInfo { width, height, scale_factor }
    }

    #[test]
    fn low_quality_caps_at_720p() {
        let (w, h) = capture_dimensions(&display(2560, 1440, 1.0), Quality::Low);
        assert_eq!((w, h), (1280, 720));
    }

    #[test]
    fn medium_quality_caps_at_1080p() {
        let (w, h) = capture_dimensions(&display(3840, 2160, 1.0), Quality::Medium);
        assert_eq!((w, h), (1920, 1080));
    }

    #[test]
    fn high_quality_is_uncapped() {
        let (w, h) = capture_dimensions(&display(3840, 2160, 1.0), Quality::High);
        assert_eq!((w, h), (3840, 2160));
    }

    #[test]
    fn small_display_is_not_upscaled() {
        let (w, h) = capture_dimensions(&display(1024, 768, 1.0), Quality::Medium);
        assert_eq!((w, h), (1024, 768));
    }

    #[test]
    fn scale_factor_feeds_native_size() {
        // 1440×900 logical at 2× is 2880×1800 native, above the medium cap.
        let (w, h) = capture_dimensions(&display(1440, 900, 2.0), Quality::Medium);
        assert!(w <= 1920 && h <= 1080);
        assert_relative_eq!(w as f64 / h as f64, 2880.0 / 1800.0, epsilon = 0.01);
    }

    #[test]
    fn downscale_preserves_aspect_ratio() {
        let (w, h) = capture_dimensions(&display(3440, 1440, 1.0), Quality::Low);
        assert!(w <= 1280 && h <= 720);
        assert_relative_eq!(w as f64 / h as f64, 3440.0 / 1440.0, epsilon = 0.01);
    }

    #[test]
    fn dimensions_are_always_even() {
        // 1366×768 at 1.25 rounds to 1708×960 — 1707.5 would be odd territory.
        let (w, h) = capture_dimensions(&display(1366, 768, 1.25), Quality::High);
        assert_eq!(w % 2, 0);
        assert_eq!(h % 2, 0);

        assert_eq!(force_even(1707), 1706);
        assert_eq!(force_even(1), 2);
        assert_eq!(force_even(0), 2);
    }

    #[test]
    fn capture_scale_reflects_downscale() {
        assert_relative_eq!(capture_scale(1920, 3840), 0.5);
        assert_relative_eq!(capture_scale(1920, 1920), 1.0);
        assert_relative_eq!(capture_scale(1920, 0), 1.0);
    }

    #[test]
    fn bitrate_ladder_steps_at_thresholds() {
        assert_eq!(bitrate_for_pixels(640 * 480), 2_500_000);
        assert_eq!(bitrate_for_pixels(1280 * 720), 5_000_000);
        assert_eq!(bitrate_for_pixels(1280 * 720 - 1), 2_500_000);
        assert_eq!(bitrate_for_pixels(1920 * 1080), 8_000_000);
        assert_eq!(bitrate_for_pixels(2560 * 1440), 12_000_000);
        assert_eq!(bitrate_for_pixels(3840 * 2160), 20_000_000);
        assert_eq!(bitrate_for_pixels(7680 * 4320), 20_000_000);
    }
}
