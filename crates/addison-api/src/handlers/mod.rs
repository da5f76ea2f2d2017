// SPDX-License-Identifier: GPL-3.0-or-later
pub mod identify;
pub mod search;
pub mod tracks;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Shared Request/Response Types
// ============================================================================

/// Body carrying one base64-encoded audio sample.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AudioRequest {
    #[serde(rename = "Audio", alias = "audio")]
    pub audio: String,
}

/// A track as it travels over HTTP: key plus base64 audio.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackBody {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Audio")]
    pub audio: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Pipeline stage that failed, for identify requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Specific failure kind, e.g. `no_match` or `not_found`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stage: None,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}

pub(crate) fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Parse a JSON body, answering 400 for anything that does not decode.
///
/// Content-Type is not checked.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(format!("Failed to decode request body: {}", e))
                .with_detail("invalid_input"),
        )
    })
}
