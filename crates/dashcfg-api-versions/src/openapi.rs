//! `OpenAPI` document for the version routes.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::models::{
    RestoreResponse, RestoreVersionRequest, RestoredConfigData, UndoRequest, VersionListResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::versions::list_versions_handler,
        crate::handlers::versions::restore_version_handler,
        crate::handlers::versions::undo_handler,
    ),
    components(schemas(
        VersionListResponse,
        RestoreVersionRequest,
        UndoRequest,
        RestoreResponse,
        RestoredConfigData,
        ErrorResponse,
        dashcfg_core::VersionRecord,
        dashcfg_core::Tab,
        dashcfg_core::TabComponent,
        dashcfg_core::ViewType,
        dashcfg_core::PipelineConfig,
        dashcfg_core::PipelineStage,
        dashcfg_core::CardStyle,
        dashcfg_core::ColorPalette,
        dashcfg_core::ConfigId,
        dashcfg_core::VersionId,
    )),
    tags(
        (name = "Configuration Versions", description = "Version history, restore and undo")
    )
)]
pub struct VersionsApiDoc;
