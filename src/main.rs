//! Notification server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use notify_api::{AppState, build_router};
use notify_auth::jwt::JwtDecoder;
use notify_core::config::AppConfig;
use notify_core::error::AppError;
use notify_database::Stores;
use notify_realtime::{ConnectionRegistry, RealtimeHub};
use notify_service::NotificationEngine;

#[tokio::main]
async fn main() {
    let env = std::env::var("NOTIFY_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting notification server v{}", env!("CARGO_PKG_VERSION"));

    // ── Storage ──────────────────────────────────────────────────
    let (stores, db) = Stores::from_config(&config).await?;

    // ── Engine + realtime ────────────────────────────────────────
    let registry = Arc::new(ConnectionRegistry::new(config.realtime.channel_buffer_size));
    let engine = Arc::new(
        NotificationEngine::new(stores, config.engine.clone()).with_push(registry.clone()),
    );
    let decoder = Arc::new(JwtDecoder::new(&config.auth));
    let realtime = Arc::new(RealtimeHub::new(
        config.realtime.clone(),
        registry,
        engine.clone(),
        decoder,
    ));

    let addr = config.server.bind_address();
    let state = AppState {
        config: Arc::new(config),
        db: db.clone(),
        engine,
        realtime: realtime.clone(),
    };
    let app = build_router(state);

    // ── HTTP server ──────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Notification server listening on {}", addr);

    let shutdown_hub = realtime.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_hub.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(db) = db {
        db.close().await;
    }

    tracing::info!("Notification server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
