//! # API Module
//!
//! The concrete operation tables served by the binary. Handlers reach the
//! data store and session provider through an [`AppContext`] built once at
//! startup; there is no global state.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::router::Router;
use crate::store::{CatalogStore, MemoryStore, SessionProvider};

pub mod v1;

/// Routing table with the v1 operation set mounted at each of `versions`.
///
/// # Errors
///
/// Any [`ConfigError`] from starting a registry; the table must not be served.
pub fn build_router(ctx: &AppContext, versions: &[u32]) -> Result<Router, ConfigError> {
    let mut router = Router::new();
    for &version in versions {
        v1::registry_at(ctx, version).start(&mut router)?;
    }
    Ok(router)
}

/// Collaborator handles shared by every operation.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogStore>,
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppContext {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, sessions: Arc<dyn SessionProvider>) -> Self {
        Self { catalog, sessions }
    }

    /// Both roles served by one in-memory store.
    #[must_use]
    pub fn from_memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            catalog: Arc::clone(&store) as Arc<dyn CatalogStore>,
            sessions: store,
        }
    }
}
