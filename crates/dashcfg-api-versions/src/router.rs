//! Router configuration for the Configuration Version API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

use crate::handlers::{list_versions_handler, restore_version_handler, undo_handler};
use crate::services::{PgVersionStore, RestoreService, VersionStore, DEFAULT_KEEP_COUNT};

/// History page size when neither the request nor the settings give one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on a history page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Tunables for the version routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionsSettings {
    /// Versions returned by `GET /versions` when no `limit` is given.
    pub page_size: usize,
    /// Versions retained per configuration after each restore.
    pub keep_count: usize,
}

impl Default for VersionsSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            keep_count: DEFAULT_KEEP_COUNT,
        }
    }
}

/// Application state for the version routes.
#[derive(Clone)]
pub struct VersionsState {
    pub service: Arc<RestoreService>,
    pub settings: VersionsSettings,
}

/// Create the version router backed by Postgres.
///
/// Provides:
/// - GET /versions?config_id= - Version history, newest first
/// - POST /versions/restore - Restore a specific version
/// - POST /versions/undo - Restore the most recent version
///
/// Requests must carry an [`Extension<Caller>`](crate::Caller).
pub fn versions_router(pool: PgPool, settings: VersionsSettings) -> Router {
    versions_router_with_store(Arc::new(PgVersionStore::new(pool)), settings)
}

/// Create the version router over any [`VersionStore`].
pub fn versions_router_with_store(
    store: Arc<dyn VersionStore>,
    settings: VersionsSettings,
) -> Router {
    let settings = VersionsSettings {
        page_size: settings.page_size.clamp(1, MAX_PAGE_SIZE),
        ..settings
    };

    let state = VersionsState {
        service: Arc::new(RestoreService::new(store, settings.keep_count)),
        settings,
    };

    Router::new()
        .route("/versions", get(list_versions_handler))
        .route("/versions/restore", post(restore_version_handler))
        .route("/versions/undo", post(undo_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = VersionsSettings::default();
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.keep_count, 20);
    }
}
