//! HTTP handlers for the Configuration Version API.

pub mod versions;

pub use versions::{list_versions_handler, restore_version_handler, undo_handler};
