//! Restore and undo of dashboard configurations.
//!
//! Both operations run the same two-step sequence inside one transaction:
//! snapshot the live state, then overwrite it with the target version. The
//! configuration row is locked before anything is read, so two restores of
//! the same configuration never interleave.

use std::sync::Arc;

use dashcfg_core::{ConfigId, LiveConfiguration, OwnerId, VersionId, VersionRecord};

use super::retention::RetentionPruner;
use super::store::VersionStore;
use crate::error::VersionError;

/// Outcome of a successful restore or undo.
#[derive(Debug, Clone)]
pub struct RestoredConfig {
    /// Live configuration after the overwrite.
    pub config: LiveConfiguration,
    /// Number of the version whose content is now live.
    pub restored_version: i32,
    /// Number of the snapshot taken of the pre-restore state.
    pub snapshot_version: i32,
}

impl RestoredConfig {
    /// Human-readable confirmation.
    #[must_use]
    pub fn message(&self) -> String {
        format!("Restored to version {}", self.restored_version)
    }
}

#[derive(Debug, Clone, Copy)]
enum RestoreTarget {
    Version(VersionId),
    Latest,
}

/// Service for listing, restoring and undoing configuration versions.
#[derive(Clone)]
pub struct RestoreService {
    store: Arc<dyn VersionStore>,
    pruner: RetentionPruner,
}

impl RestoreService {
    pub fn new(store: Arc<dyn VersionStore>, keep_count: usize) -> Self {
        let pruner = RetentionPruner::new(store.clone(), keep_count);
        Self { store, pruner }
    }

    /// Version history for a configuration the requester owns, newest first.
    pub async fn history(
        &self,
        config_id: ConfigId,
        requester: OwnerId,
        limit: usize,
    ) -> Result<Vec<VersionRecord>, VersionError> {
        let config = self
            .store
            .find_configuration(config_id)
            .await?
            .ok_or(VersionError::ConfigurationNotFound(config_id))?;

        if !config.is_owned_by(requester) {
            return Err(VersionError::Forbidden(
                "Not authorized to view this config".to_string(),
            ));
        }

        let versions = self.store.get_history(config_id, limit).await?;

        tracing::debug!(
            config_id = %config_id,
            count = versions.len(),
            limit,
            "Listed configuration versions"
        );

        Ok(versions)
    }

    /// Overwrite the live configuration with a specific version.
    pub async fn restore_to_version(
        &self,
        config_id: ConfigId,
        version_id: VersionId,
        requester: OwnerId,
    ) -> Result<RestoredConfig, VersionError> {
        self.restore(config_id, RestoreTarget::Version(version_id), requester)
            .await
    }

    /// Overwrite the live configuration with its most recent version.
    ///
    /// The pre-undo state is snapshotted first, so calling this twice in a
    /// row returns the configuration to where it started.
    pub async fn undo(
        &self,
        config_id: ConfigId,
        requester: OwnerId,
    ) -> Result<RestoredConfig, VersionError> {
        self.restore(config_id, RestoreTarget::Latest, requester)
            .await
    }

    async fn restore(
        &self,
        config_id: ConfigId,
        target: RestoreTarget,
        requester: OwnerId,
    ) -> Result<RestoredConfig, VersionError> {
        let mut tx = self.store.begin().await?;

        let current = tx
            .lock_configuration(config_id)
            .await?
            .ok_or(VersionError::ConfigurationNotFound(config_id))?;

        if !current.is_owned_by(requester) {
            return Err(VersionError::Forbidden(
                "Not authorized to modify this config".to_string(),
            ));
        }

        let version = match target {
            RestoreTarget::Version(version_id) => tx
                .get_by_id(version_id)
                .await?
                .ok_or(VersionError::VersionNotFound(version_id))?,
            RestoreTarget::Latest => tx
                .get_latest(config_id)
                .await?
                .ok_or(VersionError::NoPreviousVersion)?,
        };

        if !version.belongs_to(config_id) {
            return Err(VersionError::invalid_field(
                "Version does not belong to this config",
                "version_id",
            ));
        }

        let snapshot = tx
            .create(config_id, &current.tabs, current.colors.as_ref())
            .await?;

        let config = tx
            .overwrite_configuration(config_id, &version.tabs, version.colors.as_ref())
            .await?;

        tx.commit().await?;

        tracing::info!(
            config_id = %config_id,
            requester = %requester,
            restored_version = version.version_number,
            snapshot_version = snapshot.version_number,
            undo = matches!(target, RestoreTarget::Latest),
            "Configuration restored"
        );

        self.pruner.schedule(config_id);

        Ok(RestoredConfig {
            config,
            restored_version: version.version_number,
            snapshot_version: snapshot.version_number,
        })
    }
}
