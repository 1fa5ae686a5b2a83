//! BGRA → planar YUV 4:2:0 conversion for the built-in encoder.
//!
//! Integer BT.601 studio-swing math. Dimensions must be even; the
//! encoder trims odd crop edges before converting.

/// Size in bytes of one I420 frame.
pub fn i420_frame_len(width: u32, height: u32) -> usize {
    let luma = width as usize * height as usize;
    luma + luma / 2
}

/// Convert a packed BGRA buffer to planar I420 (Y, then U, then V).
///
/// Chroma is averaged over each 2×2 block. `width` and `height` must be
/// even and `bgra` must hold exactly `width * height * 4` bytes.
pub fn bgra_to_i420(bgra: &[u8], width: u32, height: u32) -> Vec<u8> {
    debug_assert_eq!(width % 2, 0);
    debug_assert_eq!(height % 2, 0);
    debug_assert_eq!(bgra.len(), width as usize * height as usize * 4);

    let w = width as usize;
    let h = height as usize;
    let mut out = Vec::with_capacity(i420_frame_len(width, height));

    // Luma plane.
    for y in 0..h {
        for x in 0..w {
            let p = (y * w + x) * 4;
            let (b, g, r) = (bgra[p] as i32, bgra[p + 1] as i32, bgra[p + 2] as i32);
            out.push(luma(r, g, b));
        }
    }

    // Chroma planes from 2×2 averaged RGB.
    let mut v_plane = Vec::with_capacity(w * h / 4);
    for by in (0..h).step_by(2) {
        for bx in (0..w).step_by(2) {
            let (mut r, mut g, mut b) = (0i32, 0i32, 0i32);
            for (dy, dx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let p = ((by + dy) * w + bx + dx) * 4;
                b += bgra[p] as i32;
                g += bgra[p + 1] as i32;
                r += bgra[p + 2] as i32;
            }
            let (r, g, b) = (r / 4, g / 4, b / 4);
            out.push(clamp_u8(((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128));
            v_plane.push(clamp_u8(((112 * r - 94 * g - 18 * b + 128) >> 8) + 128));
        }
    }
    out.extend_from_slice(&v_plane);

    out
}

fn luma(r: i32, g: i32, b: i32) -> u8 {
    clamp_u8(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16)
}

fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}
