//! Quiz content endpoints
//!
//! Served from the published snapshot; the store is never queried here.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use quiz_common::db::{Difficulty, GameMode, Question};
use tracing::debug;

use crate::AppState;

/// GET /difficulties
pub async fn get_difficulties(State(state): State<AppState>) -> Json<Vec<Difficulty>> {
    debug!("Get /difficulties");
    Json(state.content.load().difficulties.clone())
}

/// GET /questions
///
/// Counts an impression for the requesting client before responding.
pub async fn get_questions(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<Question>> {
    debug!("Get /questions");
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    state.classifier.observe(user_agent, &state.metrics);

    Json(state.content.load().questions.clone())
}

/// GET /gamemodes
pub async fn get_gamemodes(State(state): State<AppState>) -> Json<Vec<GameMode>> {
    debug!("Get /gamemodes");
    Json(state.content.load().gamemodes.clone())
}

/// GET /hash
///
/// Decimal content hash; clients refetch questions when it changes.
pub async fn get_hash(State(state): State<AppState>) -> String {
    state.content.content_hash().to_string()
}
