//! Highscore persistence

use quiz_common::db::{Highscore, HighscoreEntry};
use sqlx::SqlitePool;

pub async fn insert_highscore(pool: &SqlitePool, highscore: &Highscore) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO highscores (username, score, difficulty) VALUES (?, ?, ?)")
        .bind(&highscore.username)
        .bind(highscore.score)
        .bind(highscore.difficulty)
        .execute(pool)
        .await?;

    Ok(())
}

/// All highscores, grouped by difficulty, best first
pub async fn list_highscores(pool: &SqlitePool) -> Result<Vec<Highscore>, sqlx::Error> {
    sqlx::query_as::<_, Highscore>(
        "SELECT username, score, difficulty FROM highscores ORDER BY difficulty, score DESC",
    )
    .fetch_all(pool)
    .await
}

/// Highscores of one difficulty, best first
pub async fn list_highscores_for(
    pool: &SqlitePool,
    difficulty: i64,
) -> Result<Vec<HighscoreEntry>, sqlx::Error> {
    sqlx::query_as::<_, HighscoreEntry>(
        "SELECT username, score FROM highscores WHERE difficulty = ? ORDER BY score DESC",
    )
    .bind(difficulty)
    .fetch_all(pool)
    .await
}
