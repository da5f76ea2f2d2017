// SPDX-License-Identifier: GPL-3.0-or-later

//! Song recognition for raw audio samples.
//!
//! This crate provides:
//! - The [`Recognizer`] seam used by the identify pipeline
//! - An AudD API client that calls the recognition provider directly
//! - A client for a remote search service exposing the same capability over HTTP

pub mod audd;
pub mod error;
pub mod remote;

pub use audd::{AuddClient, AuddClientBuilder, RecognizedSong};
pub use error::{RecognitionError, RecognitionErrorKind, Result};
pub use remote::SearchServiceClient;

use addison_domain::AudioPayload;
use async_trait::async_trait;

/// Untrusted title text as reported by a recognizer, before sanitization.
pub type RawTitle = String;

/// Turns an audio sample into a recognized title.
///
/// Implementations make a single attempt per call. Retries and timeouts
/// belong to the caller.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, payload: &AudioPayload) -> Result<RawTitle>;
}

pub(crate) fn ensure_not_empty(payload: &AudioPayload) -> Result<()> {
    if payload.is_empty() {
        return Err(RecognitionError::InvalidPayload(
            "audio payload is empty".to_string(),
        ));
    }
    Ok(())
}
