//! Retention policy for version history.
//!
//! Keeps only the most recent `keep_count` versions of a configuration.
//! Pruning is housekeeping: it runs after a restore has committed and its
//! failures are logged, never returned to the caller of that restore.

use std::sync::Arc;

use dashcfg_core::ConfigId;
use tokio::task::JoinHandle;

use super::store::{StoreResult, VersionStore};

/// Default number of versions kept per configuration.
pub const DEFAULT_KEEP_COUNT: usize = 20;

/// Deletes versions that fall outside the retained window.
#[derive(Clone)]
pub struct RetentionPruner {
    store: Arc<dyn VersionStore>,
    keep_count: usize,
}

impl RetentionPruner {
    pub fn new(store: Arc<dyn VersionStore>, keep_count: usize) -> Self {
        Self { store, keep_count }
    }

    /// Delete every version beyond the `keep_count` newest. Returns the number deleted.
    ///
    /// Leaves `min(existing, keep_count)` versions, so a `keep_count` of zero
    /// empties the history.
    pub async fn prune(&self, config_id: ConfigId) -> StoreResult<u64> {
        let deleted = self.store.prune(config_id, self.keep_count).await?;
        if deleted > 0 {
            tracing::info!(
                config_id = %config_id,
                deleted,
                keep_count = self.keep_count,
                "Pruned old configuration versions"
            );
        }
        Ok(deleted)
    }

    /// Run [`prune`](Self::prune) on a background task.
    pub fn schedule(&self, config_id: ConfigId) -> JoinHandle<()> {
        let pruner = self.clone();
        tokio::spawn(async move {
            if let Err(e) = pruner.prune(config_id).await {
                tracing::warn!(
                    config_id = %config_id,
                    error = %e,
                    "Version pruning failed"
                );
            }
        })
    }
}
