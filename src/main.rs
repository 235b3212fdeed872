// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::application::exporter::ExportService;
use crate::infrastructure::config::load_service_config;
use crate::infrastructure::http_registry::HttpDataSourceRegistry;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{export_file, health_check, view_json};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let service_config = load_service_config()?;

    // Create registry adapter (infrastructure layer)
    let registry = Arc::new(HttpDataSourceRegistry::new(
        service_config.registry.host,
        service_config.registry.token,
    ));

    // Create services (application layer)
    let export_service = ExportService::new(registry);

    // Create application state
    let state = Arc::new(AppState { export_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboards/export/file", post(export_file))
        .route("/dashboards/export/json", post(view_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = service_config.server.listen.parse()?;
    println!("Starting dashport export service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
