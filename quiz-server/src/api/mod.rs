//! HTTP API handlers for quiz-server

pub mod content;
pub mod error;
pub mod health;
pub mod highscores;
pub mod metrics;
pub mod stats;

pub use content::{get_difficulties, get_gamemodes, get_hash, get_questions};
pub use error::ApiError;
pub use health::health_routes;
pub use highscores::{list_highscores, list_highscores_for, post_highscore};
pub use metrics::{get_metrics, track_requests};
pub use stats::{list_stats, post_stat};
