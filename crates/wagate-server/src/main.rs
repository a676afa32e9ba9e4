//! WAGate - Campaign gateway entry point

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wagate_api::AppState;
use wagate_common::config::Config;
use wagate_core::{CampaignService, DeviceManager, DispatchWorker, ValidationWorker};
use wagate_storage::{DatabasePool, DbStore};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Starting WAGate campaign gateway...");

    // Load configuration
    let config = Config::load()?;

    // Initialize database
    let db_pool = DatabasePool::new(&config.database).await?;
    db_pool.migrate().await?;

    let store = Arc::new(DbStore::new(&db_pool));

    // Device registry; the WhatsApp subsystem registers clients after login
    let devices = Arc::new(DeviceManager::new());

    // Campaign service and workers
    let service = Arc::new(CampaignService::new(
        store.clone(),
        devices.clone(),
        config.campaign.clone(),
    ));

    let dispatch_worker = Arc::new(DispatchWorker::new(
        store.clone(),
        devices.clone(),
        config.campaign.clone(),
    ));
    dispatch_worker.start().await;

    let validation_worker = Arc::new(ValidationWorker::new(store.clone(), devices.clone()));
    validation_worker.start().await;

    // API server
    let state = Arc::new(AppState {
        service,
        devices: devices.clone(),
    });
    let app = wagate_api::create_router(state);

    let addr = format!("{}:{}", config.server.bind_address, config.api.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    let api_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    info!("WAGate started successfully");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    api_handle.abort();
    dispatch_worker.stop().await;
    validation_worker.stop().await;

    info!("WAGate shutdown complete");

    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,wagate=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .init();
}
