//! Local media fetch for previews and thumbnails.
//!
//! Gallery windows ask for previously captured files by path. Paths
//! arrive URL-encoded from the renderer side; content type is sniffed
//! from the file signature with the extension as fallback. Unreadable
//! files are a not-found answer, never an error that crosses the
//! boundary.

use std::fs;
use std::path::Path;

/// Result of a local media fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaFetch {
    Found {
        data: Vec<u8>,
        content_type: &'static str,
    },
    NotFound,
}

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF87_SIGNATURE: &[u8] = b"GIF87a";
const GIF89_SIGNATURE: &[u8] = b"GIF89a";
/// EBML header shared by WebM and Matroska.
const EBML_SIGNATURE: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3];
const Y4M_SIGNATURE: &[u8] = b"YUV4MPEG2 ";

/// Fetch a captured file by (possibly URL-encoded) path.
pub fn load_media(raw_path: &str) -> MediaFetch {
    let decoded = percent_decode(raw_path);
    let path = Path::new(&decoded);

    match fs::read(path) {
        Ok(data) => {
            let content_type = sniff_content_type(&data, path);
            MediaFetch::Found { data, content_type }
        }
        Err(e) => {
            log::warn!("media not readable at {}: {}", path.display(), e);
            MediaFetch::NotFound
        }
    }
}

/// Decode `%XX` escapes; malformed escapes pass through literally.
pub fn percent_decode(input: &str) -> String {
    fn hex_val(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Content type from file signature, extension as fallback.
pub fn sniff_content_type(data: &[u8], path: &Path) -> &'static str {
    if data.starts_with(PNG_SIGNATURE) {
        return "image/png";
    }
    if data.starts_with(JPEG_SIGNATURE) {
        return "image/jpeg";
    }
    if data.starts_with(GIF87_SIGNATURE) || data.starts_with(GIF89_SIGNATURE) {
        return "image/gif";
    }
    if data.starts_with(EBML_SIGNATURE) {
        return "video/webm";
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return "video/mp4";
    }
    if data.starts_with(Y4M_SIGNATURE) {
        return "video/x-yuv4mpeg";
    }

    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webm") => "video/webm",
        Some("mp4") => "video/mp4",
        Some("y4m") => "video/x-yuv4mpeg",
        _ => "application/octet-stream",
    }
}
