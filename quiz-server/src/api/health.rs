//! Liveness, readiness and version endpoints

use axum::{extract::State, http::StatusCode, routing::get, Router};

use crate::AppState;

/// GET /_health
///
/// Liveness only: answers 200 as long as the process serves requests.
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// GET /_ready
///
/// 200 once the published snapshot has difficulties and questions,
/// 503 otherwise. Evaluated per request.
pub async fn ready_check(State(state): State<AppState>) -> StatusCode {
    if state.content.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /_version
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/_health", get(health_check))
        .route("/_ready", get(ready_check))
        .route("/_version", get(version))
}
