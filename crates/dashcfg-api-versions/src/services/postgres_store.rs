//! Postgres-backed version store.

use async_trait::async_trait;
use dashcfg_core::{
    decode_colors, decode_tabs, encode_colors, encode_tabs, ColorPalette, ConfigId,
    LiveConfiguration, OwnerId, Tab, VersionId, VersionRecord,
};
use dashcfg_db::models::{ConfigVersion, DashboardConfig};
use sqlx::{PgPool, Postgres, Transaction};

use super::store::{StoreError, StoreResult, VersionStore, VersionTransaction};

/// Version store over the `config_versions` and `dashboard_configs` tables.
#[derive(Clone)]
pub struct PgVersionStore {
    pool: PgPool,
}

impl PgVersionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionStore for PgVersionStore {
    async fn begin(&self) -> StoreResult<Box<dyn VersionTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {e}");
            StoreError::from(e)
        })?;
        Ok(Box::new(PgVersionTransaction { tx }))
    }

    async fn find_configuration(
        &self,
        config_id: ConfigId,
    ) -> StoreResult<Option<LiveConfiguration>> {
        DashboardConfig::find_by_id(&self.pool, *config_id.as_uuid())
            .await?
            .map(decode_configuration)
            .transpose()
    }

    async fn get_by_id(&self, version_id: VersionId) -> StoreResult<Option<VersionRecord>> {
        ConfigVersion::find_by_id(&self.pool, *version_id.as_uuid())
            .await?
            .map(decode_version)
            .transpose()
    }

    async fn get_latest(&self, config_id: ConfigId) -> StoreResult<Option<VersionRecord>> {
        ConfigVersion::find_latest(&self.pool, *config_id.as_uuid())
            .await?
            .map(decode_version)
            .transpose()
    }

    async fn get_history(
        &self,
        config_id: ConfigId,
        limit: usize,
    ) -> StoreResult<Vec<VersionRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        ConfigVersion::list_by_config(&self.pool, *config_id.as_uuid(), limit)
            .await?
            .into_iter()
            .map(decode_version)
            .collect()
    }

    async fn count(&self, config_id: ConfigId) -> StoreResult<usize> {
        let count = ConfigVersion::count_by_config(&self.pool, *config_id.as_uuid()).await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn prune(&self, config_id: ConfigId, keep_count: usize) -> StoreResult<u64> {
        let keep_count = i64::try_from(keep_count).unwrap_or(i64::MAX);
        Ok(
            ConfigVersion::prune_old_versions(&self.pool, *config_id.as_uuid(), keep_count)
                .await?,
        )
    }
}

/// A database transaction. Rolled back by `sqlx` when dropped uncommitted.
struct PgVersionTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VersionTransaction for PgVersionTransaction {
    async fn lock_configuration(
        &mut self,
        config_id: ConfigId,
    ) -> StoreResult<Option<LiveConfiguration>> {
        DashboardConfig::find_by_id_for_update(&mut *self.tx, *config_id.as_uuid())
            .await?
            .map(decode_configuration)
            .transpose()
    }

    async fn get_by_id(&mut self, version_id: VersionId) -> StoreResult<Option<VersionRecord>> {
        ConfigVersion::find_by_id(&mut *self.tx, *version_id.as_uuid())
            .await?
            .map(decode_version)
            .transpose()
    }

    async fn get_latest(&mut self, config_id: ConfigId) -> StoreResult<Option<VersionRecord>> {
        ConfigVersion::find_latest(&mut *self.tx, *config_id.as_uuid())
            .await?
            .map(decode_version)
            .transpose()
    }

    async fn create(
        &mut self,
        config_id: ConfigId,
        tabs: &[Tab],
        colors: Option<&ColorPalette>,
    ) -> StoreResult<VersionRecord> {
        let tabs_json = encode_tabs(tabs)?;
        let colors_json = colors.map(|c| encode_colors(Some(c))).transpose()?;

        let row = ConfigVersion::create_next_version(
            &mut self.tx,
            *config_id.as_uuid(),
            &tabs_json,
            colors_json.as_ref(),
        )
        .await?;

        decode_version(row)
    }

    async fn overwrite_configuration(
        &mut self,
        config_id: ConfigId,
        tabs: &[Tab],
        colors: Option<&ColorPalette>,
    ) -> StoreResult<LiveConfiguration> {
        let tabs_json = encode_tabs(tabs)?;
        let colors_json = colors.map(|c| encode_colors(Some(c))).transpose()?;

        let row = DashboardConfig::update_layout(
            &mut *self.tx,
            *config_id.as_uuid(),
            &tabs_json,
            colors_json.as_ref(),
        )
        .await?
        .ok_or_else(|| {
            StoreError::Unavailable(format!("configuration {config_id} vanished during restore"))
        })?;

        decode_configuration(row)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {e}");
            StoreError::from(e)
        })
    }
}

fn decode_version(row: ConfigVersion) -> StoreResult<VersionRecord> {
    Ok(VersionRecord {
        id: VersionId::from_uuid(row.id),
        config_id: ConfigId::from_uuid(row.config_id),
        version_number: row.version_number,
        tabs: decode_tabs(&row.tabs_snapshot)?,
        colors: row
            .colors_snapshot
            .as_ref()
            .map(decode_colors)
            .transpose()?
            .flatten(),
        created_at: row.created_at,
    })
}

fn decode_configuration(row: DashboardConfig) -> StoreResult<LiveConfiguration> {
    Ok(LiveConfiguration {
        id: ConfigId::from_uuid(row.id),
        owner_id: OwnerId::from_uuid(row.user_id),
        tabs: decode_tabs(&row.tabs)?,
        colors: row.colors.as_ref().map(decode_colors).transpose()?.flatten(),
        updated_at: row.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dashcfg_core::SnapshotError;
    use serde_json::json;
    use uuid::Uuid;

    fn row(tabs: serde_json::Value, colors: Option<serde_json::Value>) -> ConfigVersion {
        ConfigVersion {
            id: Uuid::new_v4(),
            config_id: Uuid::new_v4(),
            version_number: 7,
            tabs_snapshot: tabs,
            colors_snapshot: colors,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_decode_version_row() {
        let record = decode_version(row(
            json!([{"id": "t1", "label": "Clients", "icon": "users", "components": []}]),
            Some(json!({"primary": "#000000"})),
        ))
        .unwrap();

        assert_eq!(record.version_number, 7);
        assert_eq!(record.tabs[0].label, "Clients");
        assert_eq!(record.colors.unwrap().get("primary"), Some("#000000"));
    }

    #[test]
    fn test_json_null_colors_decode_as_absent() {
        let record = decode_version(row(json!([]), Some(serde_json::Value::Null))).unwrap();
        assert!(record.colors.is_none());
    }

    #[test]
    fn test_malformed_row_is_corrupt() {
        let err = decode_version(row(json!("not tabs"), None)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptSnapshot(SnapshotError::Malformed { field: "tabs", .. })
        ));
    }
}
