// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecognitionError>;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("No match found for audio sample")]
    NoMatch,

    #[error("Invalid audio payload: {0}")]
    InvalidPayload(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Recognition provider error: {0}")]
    ProviderError(String),

    #[error("Invalid response from recognition provider: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Recognition timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

/// Coarse classification of a [`RecognitionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    NoMatch,
    UpstreamError,
    InvalidPayload,
}

impl RecognitionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionErrorKind::NoMatch => "no_match",
            RecognitionErrorKind::UpstreamError => "upstream_error",
            RecognitionErrorKind::InvalidPayload => "invalid_payload",
        }
    }
}

impl RecognitionError {
    pub fn kind(&self) -> RecognitionErrorKind {
        match self {
            RecognitionError::NoMatch => RecognitionErrorKind::NoMatch,
            RecognitionError::InvalidPayload(_) => RecognitionErrorKind::InvalidPayload,
            RecognitionError::RequestFailed(_)
            | RecognitionError::ProviderError(_)
            | RecognitionError::InvalidResponse(_)
            | RecognitionError::SerializationError(_)
            | RecognitionError::Timeout(_)
            | RecognitionError::Configuration(_) => RecognitionErrorKind::UpstreamError,
        }
    }
}
