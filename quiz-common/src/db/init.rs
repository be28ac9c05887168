//! Database connection and schema bootstrap
//!
//! The quiz content itself is curated outside this service. Tables are
//! created when missing so a fresh deployment (or a test) starts from an
//! empty but well-formed store.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// How long a connection waits for a competing writer's lock
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a connection pool for `url`
///
/// Every pooled connection gets [`BUSY_TIMEOUT`].
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!(
        "Connected to database: {} (busy_timeout={}ms)",
        redact_url(url),
        BUSY_TIMEOUT.as_millis()
    );
    Ok(pool)
}

/// Create every table the service reads or writes (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_difficulties_table(pool).await?;
    create_questions_table(pool).await?;
    create_gamemodes_table(pool).await?;
    create_highscores_table(pool).await?;
    create_question_stats_table(pool).await?;

    debug!("Database schema ensured");
    Ok(())
}

async fn create_difficulties_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS difficulties (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            difficulty INTEGER NOT NULL,
            question TEXT NOT NULL,
            answer1 TEXT NOT NULL,
            answer2 TEXT NOT NULL,
            answer3 TEXT NOT NULL,
            answer4 TEXT NOT NULL,
            solution INTEGER NOT NULL CHECK (solution BETWEEN 1 AND 4),
            reference TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_gamemodes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS gamemodes (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            questions INTEGER NOT NULL DEFAULT 10,
            timelimit INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_highscores_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS highscores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            score INTEGER NOT NULL,
            difficulty INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_highscores_difficulty ON highscores(difficulty, score DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_question_stats_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS question_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question INTEGER NOT NULL,
            answer INTEGER NOT NULL,
            correct INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Strip credentials from a connection URL before logging it
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
