//! Common error types for the quiz service

use thiserror::Error;

/// Common result type for quiz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the quiz crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
