//! Snapshot store seam.
//!
//! [`VersionStore`] is the append-only log of version records plus read access
//! to the live configuration. Anything that must happen atomically goes
//! through a [`VersionTransaction`].

use async_trait::async_trait;
use dashcfg_core::{
    ColorPalette, ConfigId, LiveConfiguration, SnapshotError, Tab, VersionId, VersionRecord,
};
use dashcfg_db::DbError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The datastore could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Version-number assignment kept colliding.
    #[error("version number for configuration {config_id} is contended after {attempts} attempts")]
    Conflict { config_id: ConfigId, attempts: u32 },

    /// A stored snapshot or configuration failed typed decoding.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(#[from] SnapshotError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::VersionConflict {
                config_id,
                attempts,
            } => StoreError::Conflict {
                config_id: ConfigId::from_uuid(config_id),
                attempts,
            },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Append-only log of configuration versions.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Open a unit of work. Dropping it without `commit` discards every write.
    async fn begin(&self) -> StoreResult<Box<dyn VersionTransaction>>;

    /// Read the live configuration.
    async fn find_configuration(&self, config_id: ConfigId)
        -> StoreResult<Option<LiveConfiguration>>;

    /// Direct lookup of a version by record id.
    async fn get_by_id(&self, version_id: VersionId) -> StoreResult<Option<VersionRecord>>;

    /// The version with the highest number for a configuration.
    async fn get_latest(&self, config_id: ConfigId) -> StoreResult<Option<VersionRecord>>;

    /// Up to `limit` versions, ordered by version number descending.
    async fn get_history(&self, config_id: ConfigId, limit: usize)
        -> StoreResult<Vec<VersionRecord>>;

    /// Number of versions held for a configuration.
    async fn count(&self, config_id: ConfigId) -> StoreResult<usize>;

    /// Delete everything except the `keep_count` highest-numbered versions.
    async fn prune(&self, config_id: ConfigId, keep_count: usize) -> StoreResult<u64>;

    /// Record a snapshot with the next version number, in its own transaction.
    async fn create(
        &self,
        config_id: ConfigId,
        tabs: &[Tab],
        colors: Option<&ColorPalette>,
    ) -> StoreResult<VersionRecord> {
        let mut tx = self.begin().await?;
        let version = tx.create(config_id, tabs, colors).await?;
        tx.commit().await?;
        Ok(version)
    }
}

/// A unit of work against the store.
#[async_trait]
pub trait VersionTransaction: Send {
    /// Read the live configuration and hold it against concurrent writers
    /// until the transaction ends.
    async fn lock_configuration(
        &mut self,
        config_id: ConfigId,
    ) -> StoreResult<Option<LiveConfiguration>>;

    async fn get_by_id(&mut self, version_id: VersionId) -> StoreResult<Option<VersionRecord>>;

    async fn get_latest(&mut self, config_id: ConfigId) -> StoreResult<Option<VersionRecord>>;

    /// Append a snapshot, assigning `max(version_number) + 1` (or 1).
    async fn create(
        &mut self,
        config_id: ConfigId,
        tabs: &[Tab],
        colors: Option<&ColorPalette>,
    ) -> StoreResult<VersionRecord>;

    /// Replace the live tabs and colors and bump `updated_at`.
    async fn overwrite_configuration(
        &mut self,
        config_id: ConfigId,
        tabs: &[Tab],
        colors: Option<&ColorPalette>,
    ) -> StoreResult<LiveConfiguration>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_conflict_maps_to_conflict() {
        let config_id = uuid::Uuid::new_v4();
        let err: StoreError = DbError::VersionConflict {
            config_id,
            attempts: 3,
        }
        .into();

        match err {
            StoreError::Conflict {
                config_id: id,
                attempts,
            } => {
                assert_eq!(id.as_uuid(), &config_id);
                assert_eq!(attempts, 3);
            }
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_query_failure_maps_to_unavailable() {
        let err: StoreError = DbError::QueryFailed(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_snapshot_error_maps_to_corrupt() {
        let err: StoreError = SnapshotError::DuplicateTabId("t1".to_string()).into();
        assert_eq!(err.to_string(), "corrupt snapshot: duplicate tab id 't1'");
    }
}
