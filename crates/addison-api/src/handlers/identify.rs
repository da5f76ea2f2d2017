// SPDX-License-Identifier: GPL-3.0-or-later
use addison_application::AppState;
use addison_domain::AudioPayload;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::{info, warn};

use super::{error_response, parse_json, AudioRequest, ErrorResponse, TrackBody};

/// Identify a sample and return the matching stored recording
#[utoipa::path(
    post,
    path = "/cooltown",
    request_body = AudioRequest,
    responses(
        (status = 200, description = "Sample identified and track retrieved", body = TrackBody),
        (status = 400, description = "Malformed body or invalid audio", body = ErrorResponse),
        (status = 500, description = "Identification or retrieval failed", body = ErrorResponse)
    ),
    tag = "identify"
)]
pub async fn identify_and_fetch(State(state): State<AppState>, body: Bytes) -> Response {
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

    match state.identify.identify_and_fetch(&payload).await {
        Ok(result) => {
            info!(target: "api", key = %result.key, bytes = result.payload.len(), "identify succeeded");
            Json(TrackBody {
                id: result.key.into_string(),
                audio: result.payload.to_base64(),
            })
            .into_response()
        }
        Err(e) => {
            warn!(target: "api", error = %e, "identify failed");
            let message = match e.stage() {
                "identification" => "Failed to search for track",
                _ => "Failed to get track",
            };
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(message)
                    .with_stage(e.stage())
                    .with_detail(e.detail()),
            )
        }
    }
}
