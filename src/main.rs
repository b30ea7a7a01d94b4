// Reflectify — service bootstrap.
// dotenv → tracing → config → catalog/engine wiring → axum serve.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use reflectify::config::Config;
use reflectify::engine::catalog::IntentCatalog;
use reflectify::engine::orchestrator::ReflectionEngine;
use reflectify::engine::providers::AnyBackend;
use reflectify::server;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("[main] {err}");
            std::process::exit(1);
        }
    };

    let catalog = match &config.intents_path {
        Some(path) => Arc::new(IntentCatalog::from_path(path)),
        None => Arc::new(IntentCatalog::bundled()),
    };
    catalog.ensure_loaded();

    let backend = AnyBackend::from_config(&config.backend);
    info!(
        "[main] gateway backend '{}' ({}) at {}",
        backend.name(),
        config.backend.kind.as_str(),
        config.backend.base_url
    );

    let engine = Arc::new(ReflectionEngine::new(catalog, backend, config.engine.clone()));
    let app = server::router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("[main] could not bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!("[main] listening on {addr}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("[main] server error: {err}");
        std::process::exit(1);
    }
}
