//! YUV4MPEG2 stream framing.
//!
//! The built-in encoder emits this container because it is trivially
//! concatenable: a text stream header followed by `FRAME\n`-delimited
//! planar frames, so chunk slices glued back together in arrival order
//! form a playable file.
//!
//! Layout:
//! ```text
//! YUV4MPEG2 W<width> H<height> F<num>:<den> Ip A1:1 C420jpeg\n
//! FRAME\n  <I420 planes>
//! FRAME\n  <I420 planes>
//! ...
//! ```

/// Marker preceding every frame's plane data.
pub const FRAME_MARKER: &[u8] = b"FRAME\n";

/// Stream signature at byte zero.
pub const STREAM_MAGIC: &[u8] = b"YUV4MPEG2 ";

/// Build the stream header for progressive C420 video.
pub fn stream_header(width: u32, height: u32, fps_num: u32, fps_den: u32) -> Vec<u8> {
    format!(
        "YUV4MPEG2 W{} H{} F{}:{} Ip A1:1 C420jpeg\n",
        width, height, fps_num, fps_den
    )
    .into_bytes()
}

/// Bytes of plane data following each frame marker.
pub fn frame_data_len(width: u32, height: u32) -> usize {
    crate::pipeline::yuv::i420_frame_len(width, height)
}
