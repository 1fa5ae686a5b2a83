//! Pure frame cropping.
//!
//! Pixel data in, pixel data out; the scheduling half of the crop
//! pipeline lives in `cropper`.

use crate::models::error::CaptureError;
use crate::models::geometry::{DisplayInfo, PixelRect, Rectangle};
use crate::pipeline::frame::{VideoFrame, BYTES_PER_PIXEL};
use crate::pipeline::resolution;

/// Map a logical selection into the source stream's pixel space.
///
/// The combined factor is display scale × capture scale: the display's
/// DPI scaling takes logical coordinates to native pixels, and the
/// capture scale accounts for the backend having negotiated a stream
/// already downscaled by the quality cap.
pub fn source_pixel_rect(
    area: &Rectangle,
    display: &DisplayInfo,
    negotiated_width: u32,
) -> PixelRect {
    let (native_width, _) = display.native_pixel_size();
    let scale = display.scale_factor * resolution::capture_scale(negotiated_width, native_width);
    area.scaled(scale)
}

/// Copy `rect` out of a BGRA frame into a new frame of exactly that size.
///
/// The rectangle is clipped to the frame first; a rectangle entirely
/// outside the frame, or a frame whose buffer does not match its declared
/// dimensions, is an encoder-level error rather than a silent blank frame.
pub fn crop_frame(frame: &VideoFrame, rect: &PixelRect) -> Result<VideoFrame, CaptureError> {
    if !frame.is_well_formed() {
        return Err(CaptureError::EncoderError(format!(
            "frame buffer is {} bytes, expected {} for {}x{}",
            frame.data.len(),
            VideoFrame::expected_len(frame.width, frame.height),
            frame.width,
            frame.height
        )));
    }

    let clipped = rect
        .clipped_to(frame.width, frame.height)
        .ok_or(CaptureError::InvalidSelection)?;

    let src_stride = frame.width as usize * BYTES_PER_PIXEL;
    let row_bytes = clipped.width as usize * BYTES_PER_PIXEL;
    let mut data = Vec::with_capacity(row_bytes * clipped.height as usize);

    for row in 0..clipped.height as usize {
        let src_row = clipped.y as usize + row;
        let start = src_row * src_stride + clipped.x as usize * BYTES_PER_PIXEL;
        data.extend_from_slice(&frame.data[start..start + row_bytes]);
    }

    Ok(VideoFrame {
        data,
        width: clipped.width,
        height: clipped.height,
        timestamp_ms: frame.timestamp_ms,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Frame whose pixel at (x, y) is [x, y, 0, 255].
    fn coordinate_frame(width: u32, height: u32) -> VideoFrame {
        let mut data = Vec::with_capacity(VideoFrame::expected_len(width, height));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        VideoFrame { data, width, height, timestamp_ms: 7 }
    }

    #[test]
    fn crop_extracts_requested_pixels() {
        let frame = coordinate_frame(16, 16);
        let rect = PixelRect { x: 4, y: 6, width: 3, height: 2 };

        let cropped = crop_frame(&frame, &rect).unwrap();
        assert_eq!(cropped.width, 3);
        assert_eq!(cropped.height, 2);
        assert_eq!(cropped.timestamp_ms, 7);
        // Top-left pixel of the crop is source pixel (4, 6).
        assert_eq!(&cropped.data[0..4], &[4, 6, 0, 255]);
        // Last pixel is source pixel (6, 7).
        let last = cropped.data.len() - 4;
        assert_eq!(&cropped.data[last..], &[6, 7, 0, 255]);
    }

    #[test]
    fn crop_clips_to_frame_bounds() {
        let frame = coordinate_frame(8, 8);
        let rect = PixelRect { x: 6, y: 6, width: 10, height: 10 };

        let cropped = crop_frame(&frame, &rect).unwrap();
        assert_eq!((cropped.width, cropped.height), (2, 2));
    }

    #[test]
    fn crop_outside_frame_is_rejected() {
        let frame = coordinate_frame(8, 8);
        let rect = PixelRect { x: 100, y: 0, width: 4, height: 4 };
        assert_eq!(crop_frame(&frame, &rect), Err(CaptureError::InvalidSelection));
    }

    #[test]
    fn malformed_frame_is_rejected() {
        let mut frame = coordinate_frame(8, 8);
        frame.data.truncate(10);
        assert!(matches!(
            crop_frame(&frame, &rect(0, 0, 4, 4)),
            Err(CaptureError::EncoderError(_))
        ));
    }

    fn rect(x: u32, y: u32, width: u32, height: u32) -> PixelRect {
        PixelRect { x, y, width, height }
    }

    #[test]
    fn source_rect_folds_in_both_scales() {
        let display = DisplayInfo { width: 1920, height: 1080, scale_factor: 2.0 };
        let area = Rectangle::new(100, 50, 400, 300);

        // Native width 3840, stream negotiated at 1920 → capture scale 0.5,
        // combined factor 1.0.
        let rect = source_pixel_rect(&area, &display, 1920);
        assert_eq!(rect, PixelRect { x: 100, y: 50, width: 400, height: 300 });

        // Full-resolution stream → factor 2.0.
        let rect = source_pixel_rect(&area, &display, 3840);
        assert_eq!(rect, PixelRect { x: 200, y: 100, width: 800, height: 600 });
    }

    #[test]
    fn source_rect_on_plain_dpi_display() {
        let display = DisplayInfo { width: 1920, height: 1080, scale_factor: 1.0 };
        let area = Rectangle::new(10, 20, 333, 111);

        let rect = source_pixel_rect(&area, &display, 1920);
        assert_eq!(rect, PixelRect { x: 10, y: 20, width: 333, height: 111 });

        // Quality-capped stream at 1280 wide → factor 2/3.
        let rect = source_pixel_rect(&area, &display, 1280);
        assert_relative_eq!(rect.width as f64, 333.0 * 2.0 / 3.0, epsilon = 1.0);
        assert_relative_eq!(rect.x as f64, 10.0 * 2.0 / 3.0, epsilon = 1.0);
    }
}
