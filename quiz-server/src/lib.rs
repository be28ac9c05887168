//! quiz-server library - Quiz content service
//!
//! Serves quiz reference data from an in-memory snapshot that a background
//! synchronizer reloads from the persistent store, records highscores and
//! answer statistics, and exposes readiness and metrics endpoints.

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod classify;
pub mod content;
pub mod db;
pub mod metrics;
pub mod sync;

use classify::RequestClassifier;
use content::ContentStore;
use metrics::MetricsAggregator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (write path and listings)
    pub db: SqlitePool,
    /// Published content snapshot
    pub content: Arc<ContentStore>,
    pub metrics: Arc<MetricsAggregator>,
    pub classifier: Arc<RequestClassifier>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        content: Arc<ContentStore>,
        metrics: Arc<MetricsAggregator>,
        classifier: RequestClassifier,
    ) -> Self {
        Self {
            db,
            content,
            metrics,
            classifier: Arc::new(classifier),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let content = Router::new()
        .route("/difficulties", get(api::get_difficulties))
        .route("/questions", get(api::get_questions))
        .route("/gamemodes", get(api::get_gamemodes))
        .route("/hash", get(api::get_hash));

    let records = Router::new()
        .route("/highscores", get(api::list_highscores))
        .route("/highscores/:difficulty", get(api::list_highscores_for))
        .route("/highscore", post(api::post_highscore))
        .route("/stats", get(api::list_stats))
        .route("/stat", post(api::post_stat));

    let operational = Router::new()
        .merge(api::health_routes())
        .route("/_metrics", get(api::get_metrics));

    Router::new()
        .merge(content)
        .merge(records)
        .merge(operational)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::track_requests,
        ))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS, Method::POST])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-access-token"),
        ])
}
