//! Answer statistics persistence

use quiz_common::db::AnswerStat;
use sqlx::SqlitePool;

pub async fn insert_answer_stat(pool: &SqlitePool, stat: &AnswerStat) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO question_stats (question, answer, correct) VALUES (?, ?, ?)")
        .bind(stat.question)
        .bind(stat.answer)
        .bind(stat.correct)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn list_answer_stats(pool: &SqlitePool) -> Result<Vec<AnswerStat>, sqlx::Error> {
    sqlx::query_as::<_, AnswerStat>("SELECT question, answer, correct FROM question_stats ORDER BY id")
        .fetch_all(pool)
        .await
}
