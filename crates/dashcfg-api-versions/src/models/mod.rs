//! Request and response models for the Configuration Version API.

pub mod versions;

pub use versions::{
    Caller, ListVersionsQuery, RestoreResponse, RestoreVersionRequest, RestoredConfigData,
    UndoRequest, VersionListResponse,
};
