//! Configuration version model.
//!
//! Immutable snapshots of a dashboard configuration's tabs and colors, used for
//! restore and undo. Rows are only ever inserted or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{is_unique_violation, DbError};

/// How many times a version insert is retried after losing a numbering race.
pub const MAX_VERSION_INSERT_ATTEMPTS: u32 = 3;

/// An immutable version snapshot of a dashboard configuration.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ConfigVersion {
    /// Unique identifier for the version.
    pub id: Uuid,

    /// The configuration this version belongs to.
    pub config_id: Uuid,

    /// Sequential version number (1, 2, 3...).
    pub version_number: i32,

    /// Tabs at the moment the snapshot was taken.
    pub tabs_snapshot: serde_json::Value,

    /// Color palette at the moment the snapshot was taken, if any.
    pub colors_snapshot: Option<serde_json::Value>,

    /// When the version was created.
    pub created_at: DateTime<Utc>,
}

impl ConfigVersion {
    /// Find a version by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query_as(
            r#"
            SELECT * FROM config_versions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Get the latest version for a configuration.
    pub async fn find_latest<'e, E>(
        executor: E,
        config_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query_as(
            r#"
            SELECT * FROM config_versions
            WHERE config_id = $1
            ORDER BY version_number DESC
            LIMIT 1
            "#,
        )
        .bind(config_id)
        .fetch_optional(executor)
        .await
    }

    /// List up to `limit` versions, newest first.
    pub async fn list_by_config<'e, E>(
        executor: E,
        config_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query_as(
            r#"
            SELECT * FROM config_versions
            WHERE config_id = $1
            ORDER BY version_number DESC
            LIMIT $2
            "#,
        )
        .bind(config_id)
        .bind(limit)
        .fetch_all(executor)
        .await
    }

    /// Count versions for a configuration.
    pub async fn count_by_config<'e, E>(executor: E, config_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM config_versions
            WHERE config_id = $1
            "#,
        )
        .bind(config_id)
        .fetch_one(executor)
        .await
    }

    /// Insert a snapshot with the next version number for `config_id`.
    ///
    /// The number is derived from the table in the same statement that
    /// inserts the row. Each attempt runs in its own savepoint so that a
    /// unique violation on `(config_id, version_number)` can be retried
    /// without aborting an enclosing transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbError::VersionConflict` once `MAX_VERSION_INSERT_ATTEMPTS`
    /// attempts have all collided, or `DbError::QueryFailed` for any other
    /// database error.
    pub async fn create_next_version(
        conn: &mut PgConnection,
        config_id: Uuid,
        tabs_snapshot: &serde_json::Value,
        colors_snapshot: Option<&serde_json::Value>,
    ) -> Result<Self, DbError> {
        for attempt in 1..=MAX_VERSION_INSERT_ATTEMPTS {
            let mut savepoint = conn.begin().await?;

            let inserted: Result<Self, sqlx::Error> = sqlx::query_as(
                r#"
                INSERT INTO config_versions (
                    config_id, version_number, tabs_snapshot, colors_snapshot
                )
                SELECT $1, COALESCE(MAX(version_number), 0) + 1, $2, $3
                FROM config_versions
                WHERE config_id = $1
                RETURNING *
                "#,
            )
            .bind(config_id)
            .bind(tabs_snapshot)
            .bind(colors_snapshot)
            .fetch_one(&mut *savepoint)
            .await;

            match inserted {
                Ok(version) => {
                    savepoint.commit().await?;
                    return Ok(version);
                }
                Err(e) if is_unique_violation(&e) => {
                    savepoint.rollback().await?;
                    tracing::debug!(
                        config_id = %config_id,
                        attempt,
                        "Version number taken concurrently, retrying"
                    );
                }
                Err(e) => return Err(DbError::QueryFailed(e)),
            }
        }

        tracing::warn!(
            config_id = %config_id,
            attempts = MAX_VERSION_INSERT_ATTEMPTS,
            "Gave up claiming a version number"
        );

        Err(DbError::VersionConflict {
            config_id,
            attempts: MAX_VERSION_INSERT_ATTEMPTS,
        })
    }

    /// Delete old versions, keeping only the most recent `keep_count`.
    pub async fn prune_old_versions<'e, E>(
        executor: E,
        config_id: Uuid,
        keep_count: i64,
    ) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM config_versions
            WHERE config_id = $1
              AND version_number NOT IN (
                SELECT version_number FROM config_versions
                WHERE config_id = $1
                ORDER BY version_number DESC
                LIMIT $2
              )
            "#,
        )
        .bind(config_id)
        .bind(keep_count)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_row_serialization() {
        let version = ConfigVersion {
            id: Uuid::new_v4(),
            config_id: Uuid::new_v4(),
            version_number: 1,
            tabs_snapshot: serde_json::json!([
                {"id": "tab_1", "label": "Clients", "icon": "users", "components": []}
            ]),
            colors_snapshot: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&version).unwrap();
        assert_eq!(json["version_number"], 1);
        assert!(json["colors_snapshot"].is_null());
        assert_eq!(json["tabs_snapshot"][0]["id"], "tab_1");
    }
}
