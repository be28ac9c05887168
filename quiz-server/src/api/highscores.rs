//! Highscore endpoints
//!
//! Writes go straight to the store; listings are not cached.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use quiz_common::db::{Highscore, HighscoreEntry};
use tracing::debug;

use super::ApiError;
use crate::metrics::catalog;
use crate::{db, AppState};

const MAX_USERNAME_LEN: usize = 64;

/// GET /highscores
pub async fn list_highscores(State(state): State<AppState>) -> Result<Json<Vec<Highscore>>, ApiError> {
    debug!("Get /highscores");
    Ok(Json(db::list_highscores(&state.db).await?))
}

/// GET /highscores/:difficulty
pub async fn list_highscores_for(
    State(state): State<AppState>,
    Path(difficulty): Path<i64>,
) -> Result<Json<Vec<HighscoreEntry>>, ApiError> {
    debug!("Get /highscores/{}", difficulty);
    Ok(Json(db::list_highscores_for(&state.db, difficulty).await?))
}

/// POST /highscore
///
/// Returns 201 once the highscore is stored; metrics are only updated for
/// stored highscores.
pub async fn post_highscore(
    State(state): State<AppState>,
    body: Result<Json<Highscore>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(highscore) = body?;
    validate(&highscore)?;
    debug!("Trying to enter Highscore: {:?}", highscore);

    db::insert_highscore(&state.db, &highscore).await?;

    let difficulty = highscore.difficulty.to_string();
    let metrics = &state.metrics;
    metrics.record(catalog::HIGHSCORES_TOTAL, &[], 1);
    metrics.record(catalog::HIGHSCORES_BY_DIFFICULTY, &[difficulty.as_str()], 1);
    metrics.record(catalog::HIGHSCORES_VALUES_TOTAL, &[], highscore.score);
    metrics.record(catalog::HIGHSCORES_VALUES_BY_DIFFICULTY, &[difficulty.as_str()], highscore.score);
    metrics.record_set(catalog::LAST_HIGHSCORE_VALUE, &[], highscore.score);

    debug!("Highscore entered: {:?}", highscore);
    Ok(StatusCode::CREATED)
}

fn validate(highscore: &Highscore) -> Result<(), ApiError> {
    let username = highscore.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("username must not be empty".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "username must not exceed {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if highscore.score < 0 {
        return Err(ApiError::BadRequest("score must not be negative".to_string()));
    }
    Ok(())
}
