// SPDX-License-Identifier: GPL-3.0-or-later
pub mod handlers;

use addison_application::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use handlers::identify::{identify_and_fetch, __path_identify_and_fetch};
use handlers::search::{search, SearchResponse, __path_search};
use handlers::tracks::{
    delete_track, get_track, list_tracks, put_track, TrackListResponse, __path_delete_track,
    __path_get_track, __path_list_tracks, __path_put_track,
};
use handlers::{AudioRequest, ErrorResponse, TrackBody};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize, utoipa::ToSchema)]
struct HealthResponse {
    status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_tracks,
        get_track,
        put_track,
        delete_track,
        search,
        identify_and_fetch,
    ),
    components(
        schemas(
            HealthResponse,
            TrackBody,
            TrackListResponse,
            AudioRequest,
            SearchResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "tracks", description = "Stored recordings keyed by sanitized title"),
        (name = "identify", description = "Sample recognition and lookup")
    ),
    info(
        title = "Addison API",
        version = "0.1.0",
        description = "Identify song samples and serve the matching stored recordings",
    )
)]
struct ApiDoc;

pub fn router(state: AppState) -> Router {
    info!(target: "api", "building router");

    let body_limit = state.config.http.max_body_bytes;
    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/health", get(health))
        .route("/tracks", get(list_tracks))
        .route("/tracks/", get(list_tracks))
        .route(
            "/tracks/:key",
            get(get_track).put(put_track).delete(delete_track),
        )
        .route("/search", post(search))
        .route("/cooltown", post(identify_and_fetch))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", openapi))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
