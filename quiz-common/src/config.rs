//! Configuration loading and config file resolution
//!
//! Bootstrap settings come from a TOML file. Resolution follows the usual
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. `config.toml` in the working directory
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: the service starts with compiled
//! defaults. A malformed file is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "QUIZ_CONFIG";

/// Config file looked up in the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Reserved user-agent of the native iOS client
pub const DEFAULT_IOS_APP_TOKEN: &str = "bibelquiz-ios-app";

/// Reserved user-agent of the native Android client
pub const DEFAULT_ANDROID_APP_TOKEN: &str = "bibelquiz-android-app";

/// Bootstrap configuration loaded from TOML
///
/// These settings cannot change while the service runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// HTTP server port
    pub port: u16,

    /// Address the HTTP server binds to
    pub bind: String,

    /// Period of the content reload timer in milliseconds
    #[serde(alias = "reloadinterval")]
    pub reload_interval_ms: u64,

    pub database: DatabaseConfig,

    pub logging: LoggingConfig,

    pub classifier: ClassifierConfig,

    pub metrics: MetricsConfig,
}

/// Persistent store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    pub url: String,

    /// Upper bound of pooled connections
    pub max_connections: u32,

    /// Create missing tables at startup
    pub create_schema: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

/// Native client identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub ios_app_token: String,
    pub android_app_token: String,
}

/// Metric labelling options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Label impressions with the raw user-agent string.
    ///
    /// Raw user-agents have unbounded cardinality; `false` buckets them
    /// into `native`, `browser` and `unknown`.
    pub raw_user_agent_label: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind: "0.0.0.0".to_string(),
            reload_interval_ms: 60_000,
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            classifier: ClassifierConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://quiz.db?mode=rwc".to_string(),
            max_connections: 5,
            create_schema: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ios_app_token: DEFAULT_IOS_APP_TOKEN.to_string(),
            android_app_token: DEFAULT_ANDROID_APP_TOKEN.to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            raw_user_agent_label: true,
        }
    }
}

impl QuizConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: QuizConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or compiled defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check invariants the rest of the service relies on
    pub fn validate(&self) -> Result<()> {
        if self.reload_interval_ms == 0 {
            return Err(Error::Config("reloadinterval must be greater than 0".to_string()));
        }
        if self.database.url.trim().is_empty() {
            return Err(Error::Config("database.url must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }
        let tokens = &self.classifier;
        if tokens.ios_app_token.is_empty() || tokens.android_app_token.is_empty() {
            return Err(Error::Config("native app tokens must not be empty".to_string()));
        }
        if tokens.ios_app_token == tokens.android_app_token {
            return Err(Error::Config(
                "ios_app_token and android_app_token must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Reload timer period
    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_interval_ms)
    }
}

/// Resolve which config file to read
///
/// Priority: command-line argument, then `env_var_name`, then
/// [`DEFAULT_CONFIG_FILE`] in the working directory if it exists.
/// Returns `None` when no file applies; callers fall back to defaults.
pub fn resolve_config_path(cli_arg: Option<&str>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: config.toml next to the process
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}
