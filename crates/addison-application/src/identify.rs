// SPDX-License-Identifier: GPL-3.0-or-later

//! Identify-and-fetch pipeline.
//!
//! One call runs three strictly sequential steps:
//! 1. Recognize the sample via the configured [`Recognizer`]
//! 2. Sanitize the recognized title into a [`TrackKey`]
//! 3. Read the stored recording for that key
//!
//! Failures are reported per stage, not per cause. The underlying error is
//! kept as the source so callers can still log or expose the specific kind.

use std::sync::Arc;
use std::time::Duration;

use addison_domain::{sanitize, AudioPayload, LookupResult, TrackKey};
use addison_recognition::{RecognitionError, Recognizer};
use addison_store::{StoreError, TrackStore};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("Identification failed: {0}")]
    IdentificationFailed(#[source] RecognitionError),

    #[error("Retrieval failed for track '{key}': {source}")]
    RetrievalFailed {
        key: TrackKey,
        #[source]
        source: StoreError,
    },
}

impl IdentifyError {
    /// Pipeline stage that failed: `identification` or `retrieval`.
    pub fn stage(&self) -> &'static str {
        match self {
            IdentifyError::IdentificationFailed(_) => "identification",
            IdentifyError::RetrievalFailed { .. } => "retrieval",
        }
    }

    /// Specific failure kind inside the stage, e.g. `no_match` or `not_found`.
    pub fn detail(&self) -> &'static str {
        match self {
            IdentifyError::IdentificationFailed(e) => e.kind().as_str(),
            IdentifyError::RetrievalFailed { source, .. } => source.kind().as_str(),
        }
    }
}

pub type IdentifyResult<T> = Result<T, IdentifyError>;

pub struct IdentifyService {
    recognizer: Arc<dyn Recognizer>,
    store: Arc<dyn TrackStore>,
    recognition_timeout: Duration,
}

impl IdentifyService {
    /// # Arguments
    ///
    /// * `recognizer` - Gateway used for step 1
    /// * `store` - Store read in step 3
    /// * `recognition_timeout` - Upper bound on step 1; expiry counts as an upstream error
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        store: Arc<dyn TrackStore>,
        recognition_timeout: Duration,
    ) -> Self {
        Self {
            recognizer,
            store,
            recognition_timeout,
        }
    }

    /// Identify a sample and fetch the stored recording for it.
    ///
    /// # Returns
    ///
    /// * `Ok(LookupResult)` - Sanitized key and the stored payload
    /// * `Err(IdentifyError::IdentificationFailed)` - No match, upstream failure or bad sample;
    ///   the store is not consulted
    /// * `Err(IdentifyError::RetrievalFailed)` - The key is not stored or the store failed
    pub async fn identify_and_fetch(&self, payload: &AudioPayload) -> IdentifyResult<LookupResult> {
        debug!(target: "identify", bytes = payload.len(), "identifying sample");

        let raw_title = match tokio::time::timeout(
            self.recognition_timeout,
            self.recognizer.recognize(payload),
        )
        .await
        {
            Ok(Ok(title)) => title,
            Ok(Err(e)) => {
                warn!(target: "identify", error = %e, kind = e.kind().as_str(), "recognition failed");
                return Err(IdentifyError::IdentificationFailed(e));
            }
            Err(_) => {
                warn!(target: "identify", timeout = ?self.recognition_timeout, "recognition timed out");
                return Err(IdentifyError::IdentificationFailed(
                    RecognitionError::Timeout(self.recognition_timeout),
                ));
            }
        };

        let key = sanitize(&raw_title);
        info!(target: "identify", raw_title = %raw_title, %key, "sample recognized");

        let payload = match self.store.get(&key).await {
            Ok(payload) => payload,
            Err(source) => {
                warn!(target: "identify", %key, error = %source, "track retrieval failed");
                return Err(IdentifyError::RetrievalFailed { key, source });
            }
        };

        debug!(target: "identify", %key, bytes = payload.len(), "track retrieved");
        Ok(LookupResult { key, payload })
    }
}
