//! stream-failure-feed server entry point.
//!
//! Starts the Axum HTTP server over the configured record store.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use stream_failure_feed::api;
use stream_failure_feed::app_state::AppState;
use stream_failure_feed::config::{LogFormat, StoreBackend, ViewerConfig};
use stream_failure_feed::persistence::seed::demo_rows;
use stream_failure_feed::persistence::{InMemoryStore, PostgresStore, RecordStore};
use stream_failure_feed::service::{FeedRegistry, FeedService, TracingNotifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ViewerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        backend = %config.store_backend,
        "starting stream-failure-feed"
    );

    // Build persistence layer
    let store = open_store(&config).await?;

    // Build service layer
    let registry = Arc::new(FeedRegistry::new(config.max_feeds));
    let feed_service = Arc::new(FeedService::new(
        registry,
        store,
        Arc::new(TracingNotifier),
    ));

    // Build application state
    let app_state = AppState { feed_service };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_store(config: &ViewerConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            let store = InMemoryStore::with_rows(demo_rows(config.seed_records, Utc::now()));
            tracing::info!(rows = config.seed_records, "in-memory store seeded");
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(config)
                .await
                .context("connecting to DATABASE_URL")?;
            store.migrate().await.context("running migrations")?;
            tracing::info!("postgres store ready");
            Ok(Arc::new(store))
        }
    }
}
