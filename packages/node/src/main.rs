//! `tomolink`: the Tomolink relationship server.
//!
//! # Quick start
//!
//! ```sh
//! # Reads ./tomolink_defaults.toml, in-memory storage:
//! tomolink
//!
//! # Another config file, SQLite storage, port from the environment:
//! TOMOLINK_CONFIG=/etc/tomolink.toml DATABASE_ENGINE=sqlite PORT=9000 tomolink
//! ```
//!
//! # Environment variables
//!
//! See [`tomolink_node::config`] for the full list.

use std::sync::Arc;

use thiserror::Error;
use tomolink::{RouteError, SchemaError};
use tomolink_node::{
    build_router,
    config::{LoadedConfig, LogFormat, LoggingConfig, StorageEngine},
    MemoryStorage, NodeConfig, SqliteStorage, Storage,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum StartupError {
    #[error("invalid relationship definitions: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to compile routes: {0}")]
    Routes(#[from] RouteError),

    #[error("failed to open SQLite database at {path}: {source}")]
    Database {
        path: String,
        source: rusqlite::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() {
    let loaded = match NodeConfig::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            init_logging(&LoggingConfig::default());
            tracing::error!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    init_logging(&loaded.config.logging);

    if let Err(e) = run(loaded).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        EnvFilter::new(format!(
            "tomolink={level},tomolink_node={level},tomolink_api={level},tower_http=debug"
        ))
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn log_config(loaded: &LoadedConfig) {
    match &loaded.source {
        Some(path) => tracing::info!("config: read {}", path.display()),
        None => tracing::info!("config: no config file found, using built-in defaults"),
    }
    for o in &loaded.overrides {
        tracing::info!(var = o.var, key = o.key, value = %o.value, "config: environment override");
    }
    if loaded.config.dev {
        tracing::info!("[dev] logging all configuration settings");
        for (key, value) in loaded.config.settings() {
            tracing::info!("[dev]  {key} = {value}");
        }
    }
}

async fn run(loaded: LoadedConfig) -> Result<(), StartupError> {
    log_config(&loaded);
    let config = loaded.config;

    let schema = config.schema()?;
    for (name, kind) in schema.iter() {
        tracing::info!(relationship = name, %kind, "relationship defined");
    }
    tracing::info!(
        strict = config.relationships.strict,
        count = schema.len(),
        "relationship schema loaded"
    );

    let storage: Arc<dyn Storage> = match config.database.engine {
        StorageEngine::Sqlite => {
            let path = config.database.path.clone();
            tracing::info!("storage: SQLite at {path}");
            Arc::new(
                SqliteStorage::open(&path)
                    .map_err(|source| StartupError::Database { path, source })?,
            )
        }
        StorageEngine::Memory => {
            tracing::info!("storage: in-memory (data will not survive restart)");
            Arc::new(MemoryStorage::new())
        }
    };

    let app = build_router(storage, schema, &config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("listening on {addr}");

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return Ok(joined??),
        _ = shutdown_signal() => {}
    }

    let wait = config.graceful_wait();
    tracing::info!(wait_secs = wait.as_secs(), "shutdown signal received, draining requests");
    let _ = stop_tx.send(true);

    match tokio::time::timeout(wait, &mut server).await {
        Ok(joined) => {
            joined??;
            tracing::info!("server stopped");
        }
        Err(_) => {
            tracing::warn!("graceful wait elapsed with requests in flight, exiting");
            server.abort();
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
