// SPDX-License-Identifier: GPL-3.0-or-later
pub mod key;

pub use key::{sanitize, TrackKey, SANITIZER_VERSION, SPACE_SUBSTITUTE};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;

// ============================================================================
// Audio Payload
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("invalid base64 encoding: {0}")]
    InvalidEncoding(String),
}

/// Opaque audio bytes for one recording.
///
/// Nothing inside the payload is interpreted. Base64 helpers exist for the
/// JSON boundaries, which carry audio as a base64 string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioPayload(Bytes);

impl AudioPayload {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, PayloadError> {
        STANDARD
            .decode(encoded.trim())
            .map(Self::new)
            .map_err(|e| PayloadError::InvalidEncoding(e.to_string()))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for AudioPayload {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<&'static [u8]> for AudioPayload {
    fn from(value: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(value))
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A stored recording. Immutable once created; replaced only by delete + create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub key: TrackKey,
    pub payload: AudioPayload,
}

/// Result of one identify-and-fetch call. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub key: TrackKey,
    pub payload: AudioPayload,
}

impl From<Track> for LookupResult {
    fn from(track: Track) -> Self {
        Self {
            key: track.key,
            payload: track.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_decodes_standard_base64() {
        let payload = AudioPayload::from_base64("UklGRg==").unwrap();
        assert_eq!(payload.as_bytes(), b"RIFF");
        assert_eq!(payload.len(), 4);
        assert_eq!(payload.to_base64(), "UklGRg==");
    }

    #[test]
    fn payload_tolerates_surrounding_whitespace() {
        let payload = AudioPayload::from_base64("  UklGRg==\n").unwrap();
        assert_eq!(payload.as_bytes(), b"RIFF");
    }

    #[test]
    fn payload_rejects_invalid_base64() {
        let err = AudioPayload::from_base64("not base64!").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidEncoding(_)));
    }

    #[test]
    fn empty_base64_is_an_empty_payload() {
        let payload = AudioPayload::from_base64("").unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn lookup_result_from_track() {
        let track = Track {
            key: sanitize("Song Title"),
            payload: AudioPayload::from(&b"pcm"[..]),
        };
        let result = LookupResult::from(track);
        assert_eq!(result.key.as_str(), "Song+Title");
        assert_eq!(result.payload.as_bytes(), b"pcm");
    }
}
