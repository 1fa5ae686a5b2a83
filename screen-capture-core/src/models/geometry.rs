//! Rectangles and display geometry.
//!
//! Selections travel across window boundaries in logical (pre-DPI)
//! coordinates and are converted to physical pixels only at the point
//! where frame data is touched.

use serde::{Deserialize, Serialize};

/// A rectangle in logical screen coordinates.
///
/// Once accepted by request validation, `width` and `height` are
/// guaranteed positive; undersized drag selections are rejected outright,
/// never clamped up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Scale into pixel space by `factor`, rounding to the nearest pixel.
    ///
    /// Negative logical origins (selections nudged past a display edge)
    /// clamp to zero; the size is preserved as drawn.
    pub fn scaled(&self, factor: f64) -> PixelRect {
        PixelRect {
            x: ((self.x.max(0) as f64) * factor).round() as u32,
            y: ((self.y.max(0) as f64) * factor).round() as u32,
            width: ((self.width as f64) * factor).round().max(1.0) as u32,
            height: ((self.height as f64) * factor).round().max(1.0) as u32,
        }
    }
}

/// A rectangle in physical pixel coordinates of a specific frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Intersect with a `frame_width` × `frame_height` frame.
    ///
    /// Returns `None` when the rectangle lies entirely outside the frame.
    pub fn clipped_to(&self, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
        let x = self.x.min(frame_width);
        let y = self.y.min(frame_height);
        let right = (self.x + self.width).min(frame_width);
        let bottom = (self.y + self.height).min(frame_height);
        if right <= x || bottom <= y {
            return None;
        }
        Some(PixelRect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        })
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Logical size and DPI scale of the display a capture runs on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl DisplayInfo {
    /// Physical pixel dimensions of this display.
    pub fn native_pixel_size(&self) -> (u32, u32) {
        (
            ((self.width as f64) * self.scale_factor).round() as u32,
            ((self.height as f64) * self.scale_factor).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_rounds_to_nearest_pixel() {
        let rect = Rectangle::new(10, 20, 100, 50);
        let scaled = rect.scaled(1.5);
        assert_eq!(scaled, PixelRect { x: 15, y: 30, width: 150, height: 75 });
    }

    #[test]
    fn scaled_clamps_negative_origin() {
        let rect = Rectangle::new(-4, -2, 40, 40);
        let scaled = rect.scaled(2.0);
        assert_eq!(scaled.x, 0);
        assert_eq!(scaled.y, 0);
        assert_eq!(scaled.width, 80);
    }

    #[test]
    fn clip_inside_frame_is_identity() {
        let rect = PixelRect { x: 10, y: 10, width: 20, height: 20 };
        assert_eq!(rect.clipped_to(100, 100), Some(rect));
    }

    #[test]
    fn clip_overhanging_edges() {
        let rect = PixelRect { x: 90, y: 95, width: 20, height: 20 };
        let clipped = rect.clipped_to(100, 100).unwrap();
        assert_eq!(clipped, PixelRect { x: 90, y: 95, width: 10, height: 5 });
    }

    #[test]
    fn clip_fully_outside_is_none() {
        let rect = PixelRect { x: 200, y: 0, width: 10, height: 10 };
        assert_eq!(rect.clipped_to(100, 100), None);
    }

    #[test]
    fn native_pixel_size_applies_scale() {
        let display = DisplayInfo { width: 1440, height: 900, scale_factor: 2.0 };
        assert_eq!(display.native_pixel_size(), (2880, 1800));
    }

    #[test]
    fn rectangle_json_round_trip_is_exact() {
        let rect = Rectangle::new(-3, 17, 1279, 721);
        let display = DisplayInfo { width: 2560, height: 1440, scale_factor: 1.25 };

        let rect_json = serde_json::to_string(&rect).unwrap();
        let display_json = serde_json::to_string(&display).unwrap();

        assert_eq!(serde_json::from_str::<Rectangle>(&rect_json).unwrap(), rect);
        assert_eq!(
            serde_json::from_str::<DisplayInfo>(&display_json).unwrap(),
            display
        );
    }
}
