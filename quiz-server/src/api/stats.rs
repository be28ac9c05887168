//! Answer statistics endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use quiz_common::db::AnswerStat;
use tracing::debug;

use super::ApiError;
use crate::metrics::catalog;
use crate::{db, AppState};

/// GET /stats
pub async fn list_stats(State(state): State<AppState>) -> Result<Json<Vec<AnswerStat>>, ApiError> {
    debug!("Trying to get stats");
    let stats = db::list_answer_stats(&state.db).await?;
    debug!("Getting Stats OK");
    Ok(Json(stats))
}

/// POST /stat
pub async fn post_stat(
    State(state): State<AppState>,
    body: Result<Json<AnswerStat>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(stat) = body?;
    debug!("Trying to enter stat: {:?}", stat);

    db::insert_answer_stat(&state.db, &stat).await?;

    state.metrics.record(catalog::ANSWERS_TOTAL, &[], 1);
    if stat.correct {
        state.metrics.record(catalog::ANSWERS_RIGHT, &[], 1);
    } else {
        state.metrics.record(catalog::ANSWERS_WRONG, &[], 1);
    }

    debug!("Stat entered: {:?}", stat);
    Ok(StatusCode::CREATED)
}
