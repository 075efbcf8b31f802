//! Dashboard configuration model.
//!
//! The live configuration row belongs to the wider application. This crate
//! reads it and rewrites only its layout (`tabs`, `colors`, `updated_at`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant's live dashboard configuration.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub id: Uuid,

    /// Owner of record.
    pub user_id: Uuid,

    pub business_name: String,
    pub business_type: String,

    /// Current tabs (JSON array).
    pub tabs: serde_json::Value,

    /// Current color palette, if the tenant customized one.
    pub colors: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DashboardConfig {
    /// Find a configuration by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query_as("SELECT * FROM dashboard_configs WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a configuration and lock its row until the enclosing transaction ends.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query_as("SELECT * FROM dashboard_configs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Replace the layout of a configuration and bump `updated_at`.
    pub async fn update_layout<'e, E>(
        executor: E,
        id: Uuid,
        tabs: &serde_json::Value,
        colors: Option<&serde_json::Value>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query_as(
            r#"
            UPDATE dashboard_configs
            SET tabs = $2, colors = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tabs)
        .bind(colors)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_without_palette_serializes_null_colors() {
        let config = DashboardConfig {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            business_name: "Glow Studio".to_string(),
            business_type: "beauty".to_string(),
            tabs: serde_json::json!([]),
            colors: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&config).unwrap();
        assert!(json["colors"].is_null());
        assert_eq!(json["business_type"], "beauty");
    }
}
