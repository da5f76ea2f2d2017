// SPDX-License-Identifier: GPL-3.0-or-later
use addison_application::AppState;
use addison_domain::sanitize;
use addison_store::{StoreError, StoreErrorKind};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::{error_response, parse_json, ErrorResponse, TrackBody};

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackListResponse {
    #[serde(rename = "trackIds")]
    pub track_ids: Vec<String>,
}

fn store_error_response(err: StoreError) -> Response {
    let kind = err.kind();
    let status = match kind {
        StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
        StoreErrorKind::AlreadyExists => StatusCode::CONFLICT,
        StoreErrorKind::InvalidPayload => StatusCode::BAD_REQUEST,
        StoreErrorKind::StorageUnavailable => {
            error!(target: "api", error = %err, "track store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let message = match kind {
        StoreErrorKind::StorageUnavailable => "Internal server error".to_string(),
        _ => err.to_string(),
    };
    error_response(status, ErrorResponse::new(message).with_detail(kind.as_str()))
}

/// List the keys of all stored tracks
#[utoipa::path(
    get,
    path = "/tracks",
    responses(
        (status = 200, description = "Stored track keys", body = TrackListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tracks"
)]
pub async fn list_tracks(State(state): State<AppState>) -> Response {
    match state.store.list_keys().await {
        Ok(keys) => {
            let mut track_ids: Vec<String> = keys.into_iter().map(|k| k.into_string()).collect();
            track_ids.sort();
            debug!(target: "api", count = track_ids.len(), "listing tracks");
            Json(TrackListResponse { track_ids }).into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// Get a stored track
#[utoipa::path(
    get,
    path = "/tracks/{key}",
    params(
        ("key" = String, Path, description = "Track key; sanitized before lookup")
    ),
    responses(
        (status = 200, description = "Track found", body = TrackBody),
        (status = 404, description = "Track not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tracks"
)]
pub async fn get_track(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let key = sanitize(&key);
    debug!(target: "api", %key, "fetching track");

    match state.store.get(&key).await {
        Ok(payload) => Json(TrackBody {
            id: key.into_string(),
            audio: payload.to_base64(),
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

/// Upload a new track
#[utoipa::path(
    put,
    path = "/tracks/{key}",
    params(
        ("key" = String, Path, description = "Track key; must match the body's Id once sanitized")
    ),
    request_body = TrackBody,
    responses(
        (status = 201, description = "Track created"),
        (status = 400, description = "Malformed body, mismatched Id or invalid base64", body = ErrorResponse),
        (status = 409, description = "Track already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tracks"
)]
pub async fn put_track(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    let request: TrackBody = match parse_json(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let key = sanitize(&key);
    if sanitize(&request.id) != key {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Id in URL does not match Id in request body")
                .with_detail("invalid_input"),
        );
    }

    debug!(target: "api", %key, "creating track");
    match state.store.put_encoded(&key, &request.audio).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => store_error_response(e),
    }
}

/// Delete a stored track
#[utoipa::path(
    delete,
    path = "/tracks/{key}",
    params(
        ("key" = String, Path, description = "Track key; sanitized before lookup")
    ),
    responses(
        (status = 204, description = "Track deleted"),
        (status = 404, description = "Track not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tracks"
)]
pub async fn delete_track(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let key = sanitize(&key);
    debug!(target: "api", %key, "deleting track");

    match state.store.delete(&key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error_response(e),
    }
}
