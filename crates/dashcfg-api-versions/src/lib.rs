//! Configuration Version API for dashcfg.
//!
//! Records point-in-time snapshots of a dashboard configuration (its tabs and
//! color palette) and rolls the live configuration back to them.
//!
//! ## Features
//!
//! - **GET /versions?config_id=**: Version history, newest first
//! - **POST /versions/restore**: Restore a specific version
//! - **POST /versions/undo**: Restore the most recent version
//!
//! Every restore first snapshots the state it is about to overwrite, in the
//! same transaction, so a restore or undo can itself be undone.
//!
//! ## Authentication
//!
//! The caller identity is resolved upstream and handed to the router as an
//! [`models::Caller`] request extension. Requests without one are rejected
//! with 401.

pub mod error;
pub mod handlers;
pub mod models;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod router;
pub mod services;

pub use error::VersionError;
pub use models::Caller;
#[cfg(feature = "openapi")]
pub use openapi::VersionsApiDoc;
pub use router::{
    versions_router, versions_router_with_store, VersionsSettings, VersionsState, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use services::{
    FailingVersionStore, InMemoryVersionStore, PgVersionStore, RestoreService, RestoredConfig,
    RetentionPruner, StoreError, StoreResult, VersionStore, VersionTransaction, DEFAULT_KEEP_COUNT,
};
