//! In-memory version store for tests and local development.
//!
//! A transaction holds the whole store exclusively and works on a staged copy,
//! so transactions are serializable and an uncommitted one leaves no trace.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashcfg_core::{ColorPalette, ConfigId, LiveConfiguration, Tab, VersionId, VersionRecord};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::store::{StoreError, StoreResult, VersionStore, VersionTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    configs: HashMap<ConfigId, LiveConfiguration>,
    /// Versions per configuration in insertion (and therefore number) order.
    versions: HashMap<ConfigId, Vec<VersionRecord>>,
}

impl MemoryState {
    fn find_version(&self, version_id: VersionId) -> Option<VersionRecord> {
        self.versions
            .values()
            .flatten()
            .find(|v| v.id == version_id)
            .cloned()
    }

    fn latest(&self, config_id: ConfigId) -> Option<VersionRecord> {
        self.versions
            .get(&config_id)
            .and_then(|v| v.iter().max_by_key(|r| r.version_number))
            .cloned()
    }

    fn history(&self, config_id: ConfigId, limit: usize) -> Vec<VersionRecord> {
        let mut results = self.versions.get(&config_id).cloned().unwrap_or_default();
        results.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        results.truncate(limit);
        results
    }
}

#[derive(Debug, Default)]
struct FailurePoints {
    create: AtomicBool,
    overwrite: AtomicBool,
}

/// In-memory version store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVersionStore {
    state: Arc<Mutex<MemoryState>>,
    failures: Arc<FailurePoints>,
}

impl InMemoryVersionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a live configuration (stands in for the external repository).
    pub async fn put_configuration(&self, config: LiveConfiguration) {
        self.state.lock().await.configs.insert(config.id, config);
    }

    /// Make every subsequent snapshot insert fail (for testing atomicity).
    pub fn fail_creates(&self, fail: bool) {
        self.failures.create.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent live-configuration overwrite fail.
    pub fn fail_overwrites(&self, fail: bool) {
        self.failures.overwrite.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
    async fn begin(&self) -> StoreResult<Box<dyn VersionTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            staged,
            failures: self.failures.clone(),
        }))
    }

    async fn find_configuration(
        &self,
        config_id: ConfigId,
    ) -> StoreResult<Option<LiveConfiguration>> {
        Ok(self.state.lock().await.configs.get(&config_id).cloned())
    }

    async fn get_by_id(&self, version_id: VersionId) -> StoreResult<Option<VersionRecord>> {
        Ok(self.state.lock().await.find_version(version_id))
    }

    async fn get_latest(&self, config_id: ConfigId) -> StoreResult<Option<VersionRecord>> {
        Ok(self.state.lock().await.latest(config_id))
    }

    async fn get_history(
        &self,
        config_id: ConfigId,
        limit: usize,
    ) -> StoreResult<Vec<VersionRecord>> {
        Ok(self.state.lock().await.history(config_id, limit))
    }

    async fn count(&self, config_id: ConfigId) -> StoreResult<usize> {
        Ok(self
            .state
            .lock()
            .await
            .versions
            .get(&config_id)
            .map_or(0, Vec::len))
    }

    async fn prune(&self, config_id: ConfigId, keep_count: usize) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        let Some(versions) = state.versions.get_mut(&config_id) else {
            return Ok(0);
        };
        if versions.len() <= keep_count {
            return Ok(0);
        }

        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        let removed = versions.split_off(keep_count).len();
        versions.reverse();

        Ok(removed as u64)
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    failures: Arc<FailurePoints>,
}

#[async_trait]
impl VersionTransaction for MemoryTransaction {
    async fn lock_configuration(
        &mut self,
        config_id: ConfigId,
    ) -> StoreResult<Option<LiveConfiguration>> {
        Ok(self.staged.configs.get(&config_id).cloned())
    }

    async fn get_by_id(&mut self, version_id: VersionId) -> StoreResult<Option<VersionRecord>> {
        Ok(self.staged.find_version(version_id))
    }

    async fn get_latest(&mut self, config_id: ConfigId) -> StoreResult<Option<VersionRecord>> {
        Ok(self.staged.latest(config_id))
    }

    async fn create(
        &mut self,
        config_id: ConfigId,
        tabs: &[Tab],
        colors: Option<&ColorPalette>,
    ) -> StoreResult<VersionRecord> {
        if self.failures.create.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated insert failure".to_string()));
        }

        let versions = self.staged.versions.entry(config_id).or_default();
        let version_number = versions
            .iter()
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;

        let record = VersionRecord {
            id: VersionId::new(),
            config_id,
            version_number,
            tabs: tabs.to_vec(),
            colors: colors.cloned(),
            created_at: Utc::now(),
        };
        versions.push(record.clone());

        Ok(record)
    }

    async fn overwrite_configuration(
        &mut self,
        config_id: ConfigId,
        tabs: &[Tab],
        colors: Option<&ColorPalette>,
    ) -> StoreResult<LiveConfiguration> {
        if self.failures.overwrite.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated update failure".to_string()));
        }

        let config = self.staged.configs.get_mut(&config_id).ok_or_else(|| {
            StoreError::Unavailable(format!("configuration {config_id} vanished during restore"))
        })?;
        config.tabs = tabs.to_vec();
        config.colors = colors.cloned();
        config.updated_at = Utc::now();

        Ok(config.clone())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}

/// A version store that always fails (for testing error propagation).
#[derive(Debug, Default)]
pub struct FailingVersionStore;

fn simulated<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("simulated failure".to_string()))
}

#[async_trait]
impl VersionStore for FailingVersionStore {
    async fn begin(&self) -> StoreResult<Box<dyn VersionTransaction>> {
        simulated()
    }

    async fn find_configuration(
        &self,
        _config_id: ConfigId,
    ) -> StoreResult<Option<LiveConfiguration>> {
        simulated()
    }

    async fn get_by_id(&self, _version_id: VersionId) -> StoreResult<Option<VersionRecord>> {
        simulated()
    }

    async fn get_latest(&self, _config_id: ConfigId) -> StoreResult<Option<VersionRecord>> {
        simulated()
    }

    async fn get_history(
        &self,
        _config_id: ConfigId,
        _limit: usize,
    ) -> StoreResult<Vec<VersionRecord>> {
        simulated()
    }

    async fn count(&self, _config_id: ConfigId) -> StoreResult<usize> {
        simulated()
    }

    async fn prune(&self, _config_id: ConfigId, _keep_count: usize) -> StoreResult<u64> {
        simulated()
    }
}
