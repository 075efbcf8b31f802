//! Version listing, restore and undo payloads.

use std::str::FromStr;

use dashcfg_core::{ColorPalette, ConfigId, OwnerId, ParseIdError, Tab, VersionId, VersionRecord};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::VersionError;
use crate::services::RestoredConfig;

/// Identity of the authenticated caller, inserted as a request extension by
/// the authentication layer in front of the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: OwnerId,
}

impl Caller {
    pub fn new(user_id: OwnerId) -> Self {
        Self { user_id }
    }
}

/// Query parameters for `GET /versions`.
#[derive(Debug, Default, Deserialize, Validate)]
#[cfg_attr(
    feature = "openapi",
    derive(utoipa::IntoParams),
    into_params(parameter_in = Query)
)]
pub struct ListVersionsQuery {
    /// Configuration whose history is listed.
    pub config_id: Option<String>,
    /// Maximum number of versions to return (1-100).
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl ListVersionsQuery {
    pub fn config_id(&self) -> Result<ConfigId, VersionError> {
        required_id(self.config_id.as_deref(), "config_id", "config_id is required")
    }
}

/// Body of `POST /versions/restore`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RestoreVersionRequest {
    pub config_id: Option<String>,
    pub version_id: Option<String>,
}

impl RestoreVersionRequest {
    /// Both ids, or a validation error naming the first missing or malformed one.
    pub fn ids(&self) -> Result<(ConfigId, VersionId), VersionError> {
        const MISSING: &str = "config_id and version_id are required";
        let config_id = required_id(self.config_id.as_deref(), "config_id", MISSING)?;
        let version_id = required_id(self.version_id.as_deref(), "version_id", MISSING)?;
        Ok((config_id, version_id))
    }
}

/// Body of `POST /versions/undo`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UndoRequest {
    pub config_id: Option<String>,
}

impl UndoRequest {
    pub fn config_id(&self) -> Result<ConfigId, VersionError> {
        required_id(self.config_id.as_deref(), "config_id", "config_id is required")
    }
}

/// Response of `GET /versions`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VersionListResponse {
    pub data: Vec<VersionRecord>,
}

/// The restored live configuration.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RestoredConfigData {
    pub id: ConfigId,
    pub tabs: Vec<Tab>,
    pub colors: Option<ColorPalette>,
}

/// Response of `POST /versions/restore` and `POST /versions/undo`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RestoreResponse {
    pub data: RestoredConfigData,
    pub message: String,
}

impl From<RestoredConfig> for RestoreResponse {
    fn from(restored: RestoredConfig) -> Self {
        let message = restored.message();
        Self {
            data: RestoredConfigData {
                id: restored.config.id,
                tabs: restored.config.tabs,
                colors: restored.config.colors,
            },
            message,
        }
    }
}

/// Blank strings count as missing.
fn required_id<T>(value: Option<&str>, field: &str, missing: &str) -> Result<T, VersionError>
where
    T: FromStr<Err = ParseIdError>,
{
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| VersionError::invalid_field(missing, field))?;

    value
        .parse()
        .map_err(|_| VersionError::invalid_field(format!("{field} must be a valid UUID"), field))
}
