//! HVitOps notifications service binary entrypoint.
//!
//! Serves the HTTP API and runs the delivery worker in the same process,
//! both sharing one store handle.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hvitops_common::config::{AppConfig, StoreBackend};
use hvitops_common::redis_pool::create_redis_pool;
use hvitops_common::store::{MemoryQueueStore, QueueStore, RedisQueueStore};
use hvitops_notifier::sender::{LogSender, Sender, WebhookSender};
use hvitops_notifier::worker::DeliveryWorker;

use hvitops_api::middleware::cors::cors_layer;
use hvitops_api::routes::create_router;
use hvitops_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "hvitops_notifications=info,hvitops_api=debug,\
hvitops_engine=debug,hvitops_notifier=debug,hvitops_common=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    init_tracing(config.log_json);

    tracing::info!(service = %config.service_name, "Starting notifications service...");

    // Connect the shared store
    let store: Arc<dyn QueueStore> = match config.store_backend {
        StoreBackend::Redis => {
            let conn = create_redis_pool(&config.redis_url).await?;
            Arc::new(RedisQueueStore::new(conn))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; queued and sent notifications are lost on exit");
            Arc::new(MemoryQueueStore::new())
        }
    };

    // Pick the delivery collaborator
    let sender: Arc<dyn Sender> = match &config.webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "Delivering notifications to webhook");
            Arc::new(WebhookSender::new(url.clone())?)
        }
        None => Arc::new(LogSender),
    };

    // Start the delivery worker
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = DeliveryWorker::new(store.clone(), sender, config.worker_poll_interval());
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));

    // Build router
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(store, config);
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer());

    // Start server
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The worker finishes its current iteration before exiting
    let _ = shutdown_tx.send(true);
    worker_handle.await?;

    tracing::info!("Notifications service stopped.");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal, stopping gracefully...");
}
