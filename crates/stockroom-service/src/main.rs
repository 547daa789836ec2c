//! Stockroom Service - HTTP API for the staff inventory ledger.
//!
//! This is the main entry point for the stockroom service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockroom_service::scheduler::{PgJobScheduler, RecordingScheduler, ReminderScheduler};
use stockroom_service::{create_router, AppState, ServiceConfig};
use stockroom_store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stockroom=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stockroom Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_configured = %config.database_url.is_some(),
        civil_offset_hours = %config.civil_offset_hours,
        "Service configuration loaded"
    );

    // Initialize store + scheduler
    let (store, scheduler): (Arc<dyn Store>, Arc<dyn ReminderScheduler>) =
        if let Some(url) = &config.database_url {
            tracing::info!("Connecting to PostgreSQL");
            let store = PgStore::connect(url).await?;
            store.migrate().await?;
            let scheduler = Arc::new(PgJobScheduler::new(store.pool().clone()));
            (Arc::new(store), scheduler)
        } else {
            tracing::warn!("DATABASE_URL not set - using volatile in-memory storage");
            (
                Arc::new(MemoryStore::new()),
                Arc::new(RecordingScheduler::new()),
            )
        };

    // Build app state
    let state = AppState::new(store, scheduler, config.clone())?;

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
