//! Version records and the live configuration they are taken from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ConfigId, OwnerId, VersionId};
use crate::snapshot::{ColorPalette, Tab};

/// An immutable snapshot of a configuration's tabs and colors.
///
/// `version_number` is strictly increasing per `config_id` and is the only
/// key that decides recency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VersionRecord {
    pub id: VersionId,
    pub config_id: ConfigId,
    pub version_number: i32,
    #[serde(rename = "tabs_snapshot")]
    pub tabs: Vec<Tab>,
    #[serde(rename = "colors_snapshot")]
    pub colors: Option<ColorPalette>,
    pub created_at: DateTime<Utc>,
}

impl VersionRecord {
    /// Whether this record belongs to the given configuration.
    #[must_use]
    pub fn belongs_to(&self, config_id: ConfigId) -> bool {
        self.config_id == config_id
    }
}

/// The current, mutable state a tenant's dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LiveConfiguration {
    pub id: ConfigId,
    pub owner_id: OwnerId,
    pub tabs: Vec<Tab>,
    pub colors: Option<ColorPalette>,
    pub updated_at: DateTime<Utc>,
}

impl LiveConfiguration {
    /// Whether `requester` is the owner of record.
    #[must_use]
    pub fn is_owned_by(&self, requester: OwnerId) -> bool {
        self.owner_id == requester
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belongs_to() {
        let config_id = ConfigId::new();
        let record = VersionRecord {
            id: VersionId::new(),
            config_id,
            version_number: 1,
            tabs: vec![Tab::new("t1", "Clients", "users")],
            colors: None,
            created_at: Utc::now(),
        };

        assert!(record.belongs_to(config_id));
        assert!(!record.belongs_to(ConfigId::new()));
    }

    #[test]
    fn test_record_serializes_snapshot_field_names() {
        let record = VersionRecord {
            id: VersionId::new(),
            config_id: ConfigId::new(),
            version_number: 3,
            tabs: vec![],
            colors: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("tabs_snapshot").is_some());
        assert!(json["colors_snapshot"].is_null());
        assert_eq!(json["version_number"], 3);
    }

    #[test]
    fn test_is_owned_by() {
        let owner = OwnerId::new();
        let config = LiveConfiguration {
            id: ConfigId::new(),
            owner_id: owner,
            tabs: vec![],
            colors: None,
            updated_at: Utc::now(),
        };

        assert!(config.is_owned_by(owner));
        assert!(!config.is_owned_by(OwnerId::new()));
    }
}
