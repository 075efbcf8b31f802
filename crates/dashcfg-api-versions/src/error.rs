//! Error types for the Configuration Version API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashcfg_core::{ConfigId, VersionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::StoreError;

/// Errors that can occur while listing, restoring or undoing versions.
#[derive(Debug, Error)]
pub enum VersionError {
    /// No caller identity was supplied.
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller does not own the configuration.
    #[error("{0}")]
    Forbidden(String),

    /// Configuration not found.
    #[error("Config not found")]
    ConfigurationNotFound(ConfigId),

    /// Version not found.
    #[error("Version not found")]
    VersionNotFound(VersionId),

    /// Undo was requested but the configuration has no versions.
    #[error("No previous version available to restore")]
    NoPreviousVersion,

    /// Missing or malformed input, or a version from another configuration.
    #[error("{message}")]
    InvalidArgument {
        message: String,
        field: Option<String>,
    },

    /// Version-number assignment kept colliding.
    #[error("{0}")]
    Conflict(String),

    /// Stored data failed typed decoding.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// The datastore failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

/// Error response format for API errors.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl VersionError {
    /// Create an invalid-argument error for a specific field.
    pub fn invalid_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid-argument error without a specific field.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            field: None,
        }
    }

    /// Stable machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::ConfigurationNotFound(_) | Self::VersionNotFound(_) | Self::NoPreviousVersion => {
                "not_found"
            }
            Self::InvalidArgument { .. } => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::CorruptSnapshot(_) => "corrupt_snapshot",
            Self::Persistence(_) => "internal_error",
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::ConfigurationNotFound(_) | Self::VersionNotFound(_) | Self::NoPreviousVersion => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::CorruptSnapshot(_) | Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for VersionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::Persistence(msg),
            conflict @ StoreError::Conflict { .. } => Self::Conflict(conflict.to_string()),
            StoreError::CorruptSnapshot(e) => Self::CorruptSnapshot(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for VersionError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err.field_errors().keys().next().map(|k| k.to_string());
        Self::InvalidArgument {
            message: err.to_string(),
            field,
        }
    }
}

impl IntoResponse for VersionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, field) = match &self {
            Self::InvalidArgument { message, field } => (message.clone(), field.clone()),
            Self::Persistence(msg) => {
                tracing::error!("Persistence failure: {}", msg);
                ("An unexpected error occurred".to_string(), None)
            }
            Self::CorruptSnapshot(msg) => {
                tracing::error!("Corrupt snapshot: {}", msg);
                (self.to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field() {
        let error = VersionError::invalid_field("config_id is required", "config_id");
        match error {
            VersionError::InvalidArgument { message, field } => {
                assert_eq!(message, "config_id is required");
                assert_eq!(field, Some("config_id".to_string()));
            }
            _ => panic!("Expected InvalidArgument error"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            VersionError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            VersionError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            VersionError::NoPreviousVersion.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            VersionError::invalid("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            VersionError::Conflict("race".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            VersionError::Persistence("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_keep_their_kind() {
        let err: VersionError = StoreError::Conflict {
            config_id: ConfigId::new(),
            attempts: 3,
        }
        .into();
        assert_eq!(err.kind(), "conflict");

        let err: VersionError = StoreError::Unavailable("pool timed out".into()).into();
        assert_eq!(err.kind(), "internal_error");
    }

    #[test]
    fn test_no_previous_version_message() {
        assert_eq!(
            VersionError::NoPreviousVersion.to_string(),
            "No previous version available to restore"
        );
    }
}
