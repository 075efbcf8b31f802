//! Handlers for version history, restore and undo.
//!
//! Input is validated before the caller identity is checked, so a malformed
//! request is a 400 whether or not it is authenticated.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use validator::Validate;

use crate::error::VersionError;
use crate::models::{
    Caller, ListVersionsQuery, RestoreResponse, RestoreVersionRequest, UndoRequest,
    VersionListResponse,
};
use crate::router::VersionsState;

fn require_caller(caller: Option<Extension<Caller>>) -> Result<Caller, VersionError> {
    caller
        .map(|Extension(caller)| caller)
        .ok_or(VersionError::Unauthenticated)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, VersionError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| VersionError::invalid(rejection.body_text()))
}

/// GET /versions
///
/// Version history of a configuration, newest first.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/versions",
    params(ListVersionsQuery),
    responses(
        (status = 200, description = "Version history", body = VersionListResponse),
        (status = 400, description = "Missing or invalid config_id", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller does not own the configuration", body = crate::error::ErrorResponse),
        (status = 404, description = "Configuration not found", body = crate::error::ErrorResponse),
    ),
    tag = "Configuration Versions"
))]
pub async fn list_versions_handler(
    State(state): State<VersionsState>,
    caller: Option<Extension<Caller>>,
    query: Result<Query<ListVersionsQuery>, QueryRejection>,
) -> Result<Json<VersionListResponse>, VersionError> {
    let Query(query) = query.map_err(|rejection| VersionError::invalid(rejection.body_text()))?;
    query.validate()?;
    let config_id = query.config_id()?;
    let caller = require_caller(caller)?;

    let limit = query
        .limit
        .map_or(state.settings.page_size, |limit| limit as usize);

    let data = state
        .service
        .history(config_id, caller.user_id, limit)
        .await?;

    Ok(Json(VersionListResponse { data }))
}

/// POST /versions/restore
///
/// Restore a configuration to a specific version. The state being replaced
/// is recorded as a new version first.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/versions/restore",
    request_body = RestoreVersionRequest,
    responses(
        (status = 200, description = "Configuration restored", body = RestoreResponse),
        (status = 400, description = "Missing ids or version of another configuration", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller does not own the configuration", body = crate::error::ErrorResponse),
        (status = 404, description = "Configuration or version not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Version number contended", body = crate::error::ErrorResponse),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorResponse),
    ),
    tag = "Configuration Versions"
))]
pub async fn restore_version_handler(
    State(state): State<VersionsState>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<RestoreVersionRequest>, JsonRejection>,
) -> Result<Json<RestoreResponse>, VersionError> {
    let request = json_body(body)?;
    let (config_id, version_id) = request.ids()?;
    let caller = require_caller(caller)?;

    let restored = state
        .service
        .restore_to_version(config_id, version_id, caller.user_id)
        .await?;

    Ok(Json(restored.into()))
}

/// POST /versions/undo
///
/// Restore a configuration to its most recent version.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/versions/undo",
    request_body = UndoRequest,
    responses(
        (status = 200, description = "Configuration restored", body = RestoreResponse),
        (status = 400, description = "Missing or invalid config_id", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller does not own the configuration", body = crate::error::ErrorResponse),
        (status = 404, description = "Configuration not found or no previous version", body = crate::error::ErrorResponse),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorResponse),
    ),
    tag = "Configuration Versions"
))]
pub async fn undo_handler(
    State(state): State<VersionsState>,
    caller: Option<Extension<Caller>>,
    body: Result<Json<UndoRequest>, JsonRejection>,
) -> Result<Json<RestoreResponse>, VersionError> {
    let request = json_body(body)?;
    let config_id = request.config_id()?;
    let caller = require_caller(caller)?;

    let restored = state.service.undo(config_id, caller.user_id).await?;

    Ok(Json(restored.into()))
}
