//! Shared application state for the Axum server.

use std::sync::Arc;

use star_core::sky::StarCatalog;
use star_db::MemoryStore;
use star_search::IndexRegistry;

use crate::config::ServerConfig;

/// Shared application state, passed to all route handlers via Axum `State`.
///
/// The [`StarCatalog`] is read-only after startup. The [`IndexRegistry`]
/// owns every live session index and synchronizes internally, so handlers
/// share it without an outer lock.
///
/// # Example
///
/// ```
/// use star_server::state::AppState;
///
/// let state = AppState::new();
/// assert!(state.registry.is_empty());
/// ```
pub struct AppState {
    /// Stars and catalog designations searched by every request.
    pub catalog: StarCatalog,
    /// Per-session ranked indices backed by an in-memory store.
    pub registry: IndexRegistry,
    /// Settings the server was started with.
    pub config: ServerConfig,
}

impl AppState {
    /// Create state with an empty catalog and default configuration.
    ///
    /// Returns an `Arc<Self>` ready for sharing across Axum handlers.
    pub fn new() -> Arc<Self> {
        Self::with_catalog(StarCatalog::default(), ServerConfig::default())
    }

    /// Create state serving `catalog`, with indices paged by
    /// `config.page_size`.
    ///
    /// # Example
    ///
    /// ```
    /// use star_core::sky::StarCatalog;
    /// use star_server::config::ServerConfig;
    /// use star_server::state::AppState;
    ///
    /// let config = ServerConfig { page_size: 5, ..ServerConfig::default() };
    /// let state = AppState::with_catalog(StarCatalog::default(), config);
    /// assert_eq!(state.registry.page_size(), 5);
    /// ```
    pub fn with_catalog(catalog: StarCatalog, config: ServerConfig) -> Arc<Self> {
        let registry = IndexRegistry::with_page_size(MemoryStore::shared(), config.page_size);
        Arc::new(Self {
            catalog,
            registry,
            config,
        })
    }
}
