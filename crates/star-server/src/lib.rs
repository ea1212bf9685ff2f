//! # star-server
//!
//! HTTP layer for constellation and sky-region star searches.
//!
//! This is the leaf crate: it wires the star catalog, the index registry,
//! and the keyed store together behind an Axum router. No other crate may
//! import from here.
//!
//! ## Endpoints
//!
//! - `GET /health`: health check
//! - `POST /api/search_constellation`: select stars by constellation tag
//! - `POST /api/search_points`: select stars inside a sky polygon
//! - `POST /api/segment_search`: range query on one attribute
//! - `POST /api/sort_search`: one page of the last range query
//! - `GET|POST /api/delete_all`: evict the caller's session
//!
//! ## Sessions
//!
//! Every search starts a new session: the previous session named by the
//! `x-session-key` request header is evicted, and the new key is returned
//! both in the `x-session-key` response header and in the body.

pub mod config;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Build the Axum application router with an empty catalog and default
/// configuration.
///
/// # Example
///
/// ```no_run
/// use star_server::build_app;
///
/// #[tokio::main]
/// async fn main() {
///     let app = build_app();
///     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
///     axum::serve(listener, app).await.unwrap();
/// }
/// ```
pub fn build_app() -> Router {
    build_app_with_state(AppState::new())
}

/// Build the Axum router around a pre-created [`AppState`].
///
/// Lets the caller keep an `Arc` to the state, e.g. to inspect the
/// registry in tests.
pub fn build_app_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/search_constellation", post(routes::search_constellation))
        .route("/api/search_points", post(routes::search_points))
        .route("/api/segment_search", post(routes::segment_search))
        .route("/api/sort_search", post(routes::sort_search))
        .route(
            "/api/delete_all",
            get(routes::delete_all).post(routes::delete_all),
        )
        .with_state(state)
}
