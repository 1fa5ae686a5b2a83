//! Gallery directory persistence.
//!
//! Receives finished payloads from the capture core and writes them into
//! the gallery directory with a JSON metadata sidecar. A zero-byte
//! payload is a failed capture and is never written out as an empty
//! file.

use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use screen_capture_core::models::recording_result::CaptureMetadata;
use screen_capture_core::{CaptureError, MediaFormat, MediaStore, RecordingPayload, StoredFile};

pub struct FsMediaStore {
    dir: PathBuf,
}

impl FsMediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl MediaStore for FsMediaStore {
    fn store(
        &self,
        payload: &RecordingPayload,
        format: MediaFormat,
    ) -> Result<StoredFile, CaptureError> {
        if payload.is_empty() {
            return Err(CaptureError::EmptyPayload);
        }

        fs::create_dir_all(&self.dir)
            .map_err(|e| CaptureError::StorageError(format!("failed to create gallery dir: {}", e)))?;

        let checksum = {
            let digest = Sha256::digest(&payload.buffer);
            digest.iter().map(|b| format!("{:02x}", b)).collect::<String>()
        };
        let metadata = CaptureMetadata::new(payload, format, &checksum);

        let filename = format!("capture-{}.{}", metadata.id, format.extension());
        let path = self.dir.join(&filename);
        fs::write(&path, &payload.buffer)
            .map_err(|e| CaptureError::StorageError(format!("failed to write capture: {}", e)))?;

        let sidecar = path.with_extension(format!("{}.metadata.json", format.extension()));
        let json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
        fs::write(&sidecar, json)
            .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;

        log::info!("stored {} ({} bytes)", filename, payload.buffer.len());
        Ok(StoredFile {
            id: metadata.id,
            filepath: path.to_string_lossy().into_owned(),
            filename,
            size: payload.buffer.len() as u64,
            created_at: metadata.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(bytes: &[u8]) -> RecordingPayload {
        RecordingPayload {
            buffer: bytes.to_vec(),
            width: 640,
            height: 480,
            duration_secs: 2.5,
        }
    }

    #[test]
    fn stores_bytes_and_returns_a_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());

        let stored = store.store(&payload(b"encoded-bytes"), MediaFormat::Webm).unwrap();

        assert!(stored.filename.ends_with(".webm"));
        assert_eq!(stored.size, 13);
        assert_eq!(fs::read(&stored.filepath).unwrap(), b"encoded-bytes");
    }

    #[test]
    fn writes_a_metadata_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());

        let stored = store.store(&payload(b"data"), MediaFormat::Png).unwrap();
        let sidecar = PathBuf::from(&stored.filepath).with_extension("png.metadata.json");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(sidecar).unwrap()).unwrap();
        assert_eq!(json["id"], serde_json::Value::String(stored.id.clone()));
        assert_eq!(json["width"], 640);
        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["checksum"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn empty_payload_is_a_failed_capture() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());

        let result = store.store(&RecordingPayload::empty(1.0), MediaFormat::Webm);
        assert_eq!(result.unwrap_err(), CaptureError::EmptyPayload);

        // Nothing may be left behind, not even a zero-length file.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn successive_stores_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path());

        let a = store.store(&payload(b"a"), MediaFormat::Webm).unwrap();
        let b = store.store(&payload(b"b"), MediaFormat::Webm).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.filename, b.filename);
    }
}
