//! Process lifecycle: schema, import, serve, graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::import::{import_if_empty, ImportOutcome};
use crate::middleware::RateLimiter;
use crate::routes::app;
use crate::schema::ensure_records_table;
use crate::state::AppState;
use crate::store::{PgRecordStore, RecordStore};

/// Connect, create the table, import on first run, then serve until a
/// termination signal. Any failure before binding is returned without serving.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.connect_options()?)
        .await
        .map_err(ServerError::Connect)?;

    ensure_records_table(&pool).await.map_err(ServerError::Schema)?;

    let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));
    if let Err(e) = bootstrap(store.as_ref(), &config).await {
        store.close().await;
        return Err(e);
    }

    serve(store, &config).await
}

pub async fn bootstrap(store: &dyn RecordStore, config: &AppConfig) -> Result<ImportOutcome, ServerError> {
    let outcome = import_if_empty(store, &config.csv_path).await?;
    tracing::info!(?outcome, "bootstrap complete");
    Ok(outcome)
}

/// Bind and serve `store` until shutdown, then close the store.
pub async fn serve(store: Arc<dyn RecordStore>, config: &AppConfig) -> Result<(), ServerError> {
    let limiter = Arc::new(RateLimiter::new(config.http.rate_limit));
    let pruner = {
        let limiter = limiter.clone();
        let period = config.http.rate_limit.window;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.prune();
                tracing::debug!(removed, "pruned rate limit windows");
            }
        })
    };

    let router = app(AppState::new(store.clone()), &config.http, limiter);
    let listener = TcpListener::bind(config.socket_addr())
        .await
        .map_err(ServerError::Bind)?;
    let addr = listener.local_addr().map_err(ServerError::Bind)?;
    tracing::info!("EMR API server listening on {}", addr);
    tracing::info!("health check: http://localhost:{}/health", addr.port());

    let served = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve);

    pruner.abort();
    store.close().await;
    tracing::info!("database pool closed, shutdown complete");
    served
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to register SIGTERM handler: {e}, falling back to SIGINT only");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down gracefully"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down gracefully"),
    }
}
