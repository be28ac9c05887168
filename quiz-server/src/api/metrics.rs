//! Metrics endpoint and request counting middleware

use axum::{
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::ApiError;
use crate::metrics::catalog;
use crate::AppState;

/// GET /_metrics
///
/// Prometheus text exposition of every touched series.
pub async fn get_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Count requests by method, route template and status
///
/// Installed as a route layer so the matched template is known; raw paths
/// would give one series per highscore difficulty.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    state.metrics.record(
        catalog::HTTP_REQUESTS_TOTAL,
        &[method.as_str(), path.as_str(), response.status().as_str()],
        1,
    );
    response
}
