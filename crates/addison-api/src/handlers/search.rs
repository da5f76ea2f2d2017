// SPDX-License-Identifier: GPL-3.0-or-later
use addison_application::AppState;
use addison_domain::AudioPayload;
use addison_recognition::RecognitionErrorKind;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::{error_response, parse_json, AudioRequest, ErrorResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Title as recognized, before sanitization.
    #[serde(rename = "Id")]
    pub id: String,
}

/// Recognize an audio sample and return the raw title
#[utoipa::path(
    post,
    path = "/search",
    request_body = AudioRequest,
    responses(
        (status = 200, description = "Sample recognized", body = SearchResponse),
        (status = 400, description = "Malformed body or invalid audio", body = ErrorResponse),
        (status = 404, description = "No match for the sample", body = ErrorResponse),
        (status = 502, description = "Recognition provider failed", body = ErrorResponse)
    ),
    tag = "identify"
)]
pub async fn search(State(state): State<AppState>, body: Bytes) -> Response {
    let request: AudioRequest = match parse_json(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let payload = match AudioPayload::from_base64(&request.audio) {
        Ok(payload) => payload,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(e.to_string()).with_detail("invalid_payload"),
            )
        }
    };

    match state.recognizer.recognize(&payload).await {
        Ok(title) => {
            debug!(target: "api", %title, "sample recognized");
            Json(SearchResponse { id: title }).into_response()
        }
        Err(e) => {
            let kind = e.kind();
            let status = match kind {
                RecognitionErrorKind::NoMatch => StatusCode::NOT_FOUND,
                RecognitionErrorKind::InvalidPayload => StatusCode::BAD_REQUEST,
                RecognitionErrorKind::UpstreamError => {
                    warn!(target: "api", error = %e, "recognition provider failed");
                    StatusCode::BAD_GATEWAY
                }
            };
            error_response(status, ErrorResponse::new(e.to_string()).with_detail(kind.as_str()))
        }
    }
}
