//! Reference data queries used by the synchronizer

use quiz_common::db::{Difficulty, GameMode, Question};
use sqlx::SqlitePool;

pub async fn fetch_difficulties(pool: &SqlitePool) -> Result<Vec<Difficulty>, sqlx::Error> {
    sqlx::query_as::<_, Difficulty>("SELECT id, name, points FROM difficulties ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn fetch_questions(pool: &SqlitePool) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, difficulty, question, answer1, answer2, answer3, answer4, solution, reference
        FROM questions
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_gamemodes(pool: &SqlitePool) -> Result<Vec<GameMode>, sqlx::Error> {
    sqlx::query_as::<_, GameMode>(
        "SELECT id, name, description, questions, timelimit FROM gamemodes ORDER BY id",
    )
    .fetch_all(pool)
    .await
}
