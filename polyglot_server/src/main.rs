//! Polyglot API server.
//!
//! Serves registration, login and the language catalogue over HTTP, backed by
//! PostgreSQL or, with `--in-memory`, by a process-local store.

use std::sync::Arc;

use anyhow::{Context, Error};
use pico_args::Arguments;
use polyglot::{
    auth::{AuthManager, PasswordHasher, TokenService},
    db::{Database, MemoryStore},
    language::LanguageManager,
};
use polyglot_server::{
    api,
    config::{Overrides, ServerConfig},
    logging, metrics,
};
use tracing::info;

const HELP: &str = "\
Run the polyglot API server

USAGE:
  polyglot_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address    [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url        URL      Database connection string    [default: env DATABASE_URL]
  --metrics-bind  IP:PORT  Prometheus exporter address   [default: env METRICS_BIND, disabled if unset]

FLAGS:
  --in-memory              Keep all data in process memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET               JWT signing secret (required, at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (required, at least 16 characters)
  TOKEN_TTL_SECS           Session token lifetime  [default: 3600]
  CORS_ORIGINS             Comma separated allowed origins  [default: any]
  DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT_SECS,
  DB_IDLE_TIMEOUT_SECS, DB_MAX_LIFETIME_SECS  Pool tuning
  RUST_LOG                 Log filter  [default: info,sqlx=warn,hyper=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let in_memory = pargs.contains("--in-memory");
    let overrides = Overrides {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        metrics_bind: pargs.opt_value_from_str("--metrics-bind")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}\n\n{HELP}");
    }

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exported on http://{addr}/metrics");
    }

    let hasher = PasswordHasher::new(config.security.password_pepper.clone());
    let tokens = TokenService::with_ttl(
        &config.security.jwt_secret,
        chrono::Duration::seconds(config.security.token_ttl_secs),
    );

    let state = if in_memory {
        info!("Using the in-memory store; data is lost on exit");
        let store = Arc::new(MemoryStore::new());
        api::AppState {
            auth_manager: Arc::new(AuthManager::with_store(store.clone(), hasher, tokens)),
            language_manager: Arc::new(LanguageManager::new(store)),
            database: None,
        }
    } else {
        info!("Connecting to database");
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to apply database schema")?;
        info!("Database connected successfully");

        let store = Arc::new(db.store());
        api::AppState {
            auth_manager: Arc::new(AuthManager::with_store(store.clone(), hasher, tokens)),
            language_manager: Arc::new(LanguageManager::new(store)),
            database: Some(db),
        }
    };

    let database = state.database.clone();
    let app = api::create_router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        // Without a signal handler, keep serving until killed.
        std::future::pending::<()>().await;
    }
}
