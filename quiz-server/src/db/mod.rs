//! Persistent store access for quiz-server
//!
//! Reference data is read only by the synchronizer. Highscores and answer
//! statistics are written straight through by the HTTP handlers and are
//! not cached.

mod content;
mod highscores;
mod stats;

pub use content::{fetch_difficulties, fetch_gamemodes, fetch_questions};
pub use highscores::{insert_highscore, list_highscores, list_highscores_for};
pub use stats::{insert_answer_stat, list_answer_stats};
