//! quiz-server - Quiz content service
//!
//! Loads quiz content from the persistent store, keeps it in memory and
//! reloads it on a timer. The first load completes before the HTTP server
//! starts; any failed content fetch terminates the process with a
//! stage-specific exit code:
//!
//! | code | meaning                                  |
//! |------|------------------------------------------|
//! | 1    | startup failure (config, database, bind) |
//! | 2    | difficulties fetch failed                |
//! | 3    | questions fetch failed                   |
//! | 4    | game modes fetch failed                  |

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use quiz_common::config::{resolve_config_path, QuizConfig, CONFIG_ENV_VAR};
use quiz_common::db::{connect, init_schema};
use quiz_server::classify::RequestClassifier;
use quiz_server::content::ContentStore;
use quiz_server::metrics::{catalog, MetricsAggregator};
use quiz_server::sync::{FetchError, SyncOutcome, Synchronizer};
use quiz_server::{build_router, AppState};
use tokio::signal;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for quiz-server
///
/// Flags override values from the config file.
#[derive(Parser, Debug)]
#[command(name = "quiz-server")]
#[command(about = "Quiz content service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "QUIZ_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "QUIZ_BIND")]
    bind: Option<String>,

    /// sqlx database URL
    #[arg(long, env = "QUIZ_DATABASE_URL")]
    database_url: Option<String>,

    /// Content reload interval in milliseconds
    #[arg(long, env = "QUIZ_RELOAD_INTERVAL")]
    reload_interval: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut QuizConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Some(interval) = self.reload_interval {
            config.reload_interval_ms = interval;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let mut config =
        QuizConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Initialize tracing; RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &config.logging.level;
                format!("quiz_server={level},quiz_common={level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting quiz-server v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using compiled defaults"),
    }

    let pool = connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    if config.database.create_schema {
        init_schema(&pool)
            .await
            .context("Failed to create database schema")?;
    }

    let metrics = Arc::new(MetricsAggregator::new().context("Failed to register metrics")?);
    metrics.record_set(catalog::VERSION, &[env!("CARGO_PKG_VERSION")], 1);

    let content = Arc::new(ContentStore::new());
    let synchronizer = Arc::new(Synchronizer::new(
        pool.clone(),
        Arc::clone(&content),
        Arc::clone(&metrics),
    ));

    // Initial load blocks startup; readiness depends on it
    match synchronizer.sync_once().await {
        Ok(SyncOutcome::Published { content_hash, .. }) => {
            let snapshot = content.load();
            info!(
                "✓ Loaded {} difficulties, {} questions, {} game modes (hash {})",
                snapshot.difficulties.len(),
                snapshot.questions.len(),
                snapshot.gamemodes.len(),
                content_hash
            );
        }
        Ok(SyncOutcome::Skipped) => {}
        Err(e) => terminate(&e),
    }
    if !content.is_ready() {
        warn!("Store holds no difficulties or questions; /_ready reports 503");
    }

    let cancel = CancellationToken::new();
    let mut sync_task = tokio::spawn(
        Arc::clone(&synchronizer).run(config.reload_interval(), cancel.child_token()),
    );

    let classifier = RequestClassifier::new(&config.classifier, &config.metrics);
    let state = AppState::new(pool, content, metrics, classifier);
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    warn!("Serving plain HTTP; terminate TLS in front of this service");
    info!("quiz-server listening on http://{}", addr);
    info!("Readiness check: http://{}/_ready", addr);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .into_future();

    tokio::select! {
        result = server => {
            result.context("Server error")?;
        }
        joined = &mut sync_task => {
            check_sync_task(joined)?;
            warn!("Content synchronization ended before the server");
        }
    }

    cancel.cancel();
    if !sync_task.is_finished() {
        check_sync_task(sync_task.await)?;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Turn the outcome of the reload task into the process outcome
///
/// Fetch failures exit with their stage code; a panicked task is an error
/// so the process exits non-zero.
fn check_sync_task(joined: Result<Result<(), FetchError>, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => terminate(&e),
        Err(e) => {
            error!("Content synchronization task failed: {}", e);
            Err(anyhow::Error::new(e).context("Content synchronization task failed"))
        }
    }
}

/// Log a fatal fetch failure and exit with its stage code
fn terminate(err: &FetchError) -> ! {
    error!("Fatal: {} (exiting with code {})", err, err.exit_code());
    std::process::exit(err.exit_code());
}

/// Graceful shutdown signal handler
///
/// Cancels `cancel` so the reload timer stops with the server.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }

    cancel.cancel();
}
