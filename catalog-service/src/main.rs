use catalog_service::config::{BackendKind, ServiceConfig, DEFAULT_LOG_FILTER};
use catalog_service::models::memory::MemoryCatalog;
use catalog_service::models::postgres::PostgresCatalog;
use catalog_service::{build_router, AppState, Backend};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let backend: Backend = match config.backend {
        BackendKind::Postgres => {
            info!("Using PostgreSQL backend");
            match PostgresCatalog::new(&config.database_url, config.max_connections).await {
                Ok(catalog) => Arc::new(catalog),
                Err(e) => {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    std::process::exit(1);
                }
            }
        }
        BackendKind::Memory => {
            info!("Using in-memory backend");
            Arc::new(MemoryCatalog::new())
        }
    };

    if let Err(e) = backend.test_connection().await {
        error!("Failed to connect to catalog store: {}", e);
        std::process::exit(1);
    }
    info!("Catalog store connection successful");

    let app = build_router(AppState::new(backend, config.backend.as_str()));

    let addr = config.bind_addr();
    info!("Catalog service starting on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
