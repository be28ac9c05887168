//! # Quiz Common Library
//!
//! Shared code for the quiz content service including:
//! - Persistent store models and schema bootstrap
//! - Bootstrap configuration loading
//! - Common error type

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;

pub use config::QuizConfig;
pub use error::{Error, Result};
