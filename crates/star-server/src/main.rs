//! Star search server entry point.

use std::process;

use tracing_subscriber::EnvFilter;

use star_core::sky::StarCatalog;
use star_server::config::ServerConfig;
use star_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => match StarCatalog::load_json(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!("{e}");
                process::exit(1);
            }
        },
        None => {
            tracing::warn!("STARAPP_CATALOG not set, serving an empty catalog");
            StarCatalog::default()
        }
    };

    let bind_addr = config.bind_addr.clone();
    let app = star_server::build_app_with_state(AppState::with_catalog(catalog, config));

    tracing::info!("Starting star search server on {bind_addr}");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("Star search server listening on {bind_addr}");

    axum::serve(listener, app).await.expect("server error");
}
