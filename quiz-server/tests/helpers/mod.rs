//! Shared fixtures for quiz-server integration tests
//!
//! Every test gets its own in-memory SQLite store. The pool is capped at
//! one connection: each `sqlite::memory:` connection is a separate database.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use quiz_common::config::{ClassifierConfig, MetricsConfig};
use quiz_server::classify::RequestClassifier;
use quiz_server::content::ContentStore;
use quiz_server::metrics::MetricsAggregator;
use quiz_server::sync::Synchronizer;
use quiz_server::{build_router, AppState};
use sqlx::SqlitePool;
use tracing_subscriber::fmt::MakeWriter;

pub const IOS_APP: &str = "bibelquiz-ios-app";
pub const ANDROID_APP: &str = "bibelquiz-android-app";

/// Everything a test needs to drive the service without a socket
pub struct TestService {
    pub pool: SqlitePool,
    pub content: Arc<ContentStore>,
    pub metrics: Arc<MetricsAggregator>,
    pub synchronizer: Arc<Synchronizer>,
    pub app: axum::Router,
}

/// Fresh store with the schema applied and no rows
pub async fn setup_test_db() -> SqlitePool {
    let pool = quiz_common::db::connect("sqlite::memory:", 1)
        .await
        .expect("Should open in-memory database");
    quiz_common::db::init_schema(&pool)
        .await
        .expect("Should create schema");
    pool
}

pub fn setup_service(pool: SqlitePool) -> TestService {
    let content = Arc::new(ContentStore::new());
    let metrics = Arc::new(MetricsAggregator::new().expect("Should register metrics"));
    let synchronizer = Arc::new(Synchronizer::new(
        pool.clone(),
        Arc::clone(&content),
        Arc::clone(&metrics),
    ));
    let classifier = RequestClassifier::new(&ClassifierConfig::default(), &MetricsConfig::default());
    let state = AppState::new(pool.clone(), Arc::clone(&content), Arc::clone(&metrics), classifier);

    TestService {
        pool,
        content,
        metrics,
        synchronizer,
        app: build_router(state),
    }
}

pub async fn seed_difficulties(pool: &SqlitePool, count: i64) {
    let names = ["Leicht", "Mittel", "Schwer", "Experte"];
    for id in 1..=count {
        let name = names[(id as usize - 1) % names.len()];
        sqlx::query("INSERT INTO difficulties (id, name, points) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(id)
            .execute(pool)
            .await
            .expect("Should insert difficulty");
    }
}

pub async fn seed_questions(pool: &SqlitePool, count: i64) {
    for id in 1..=count {
        sqlx::query(
            r#"
            INSERT INTO questions
                (id, difficulty, question, answer1, answer2, answer3, answer4, solution, reference)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(id % 3 + 1)
        .bind(format!("Wer baute die Arche? ({})", id))
        .bind("Noah")
        .bind("Mose")
        .bind("David")
        .bind("Paulus")
        .bind(1_i64)
        .bind(Some("1. Mose 6,14"))
        .execute(pool)
        .await
        .expect("Should insert question");
    }
}

pub async fn seed_gamemodes(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO gamemodes (id, name, description, questions, timelimit) VALUES (1, 'Klassisch', NULL, 10, NULL), (2, 'Zeitrennen', 'Gegen die Uhr', 20, 15)",
    )
    .execute(pool)
    .await
    .expect("Should insert game modes");
}

/// 3 difficulties, 10 questions, 2 game modes
pub async fn seed_content(pool: &SqlitePool) {
    seed_difficulties(pool, 3).await;
    seed_questions(pool, 10).await;
    seed_gamemodes(pool).await;
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        let buffer = self.0.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Subscriber writing plain-text events at info and above into `self`
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
