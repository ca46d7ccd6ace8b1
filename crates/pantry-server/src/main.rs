//! Pantry Server - Main entry point

use anyhow::Result;
use pantry_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use pantry_server::{
    api::{self, AppState},
    audit::{ChangeConsumer, ChangeInterceptor, ChangeQueue},
    config::Config,
    db::{self, DbConfig},
    store::EntityStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("pantry-server")
        .filter_directives("pantry_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    init_logging(&log_config)?;

    info!("Starting Pantry Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&DbConfig::from(&config.database)).await?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    // Change auditing: interceptor -> queue -> single consumer
    let (queue, receiver) = ChangeQueue::with_max_pending(config.audit.max_pending);
    let consumer = ChangeConsumer::start(receiver, pool.clone(), CancellationToken::new());
    let interceptor = ChangeInterceptor::new(config.audit.serializer()?, queue);
    let store = EntityStore::new(pool.clone()).with_observer(interceptor);

    let state = AppState { db: pool, store };
    let app = api::create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    consumer.shutdown().await;

    info!("Server shut down gracefully");

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
