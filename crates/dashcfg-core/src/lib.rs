//! dashcfg Core Library
//!
//! Shared types for the dashboard configuration version store.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (ConfigId, VersionId, OwnerId)
//! - [`snapshot`] - Typed tab and color palette structures with validating decoders
//! - [`record`] - Version records and the live configuration view
//! - [`error`] - Snapshot decoding errors (SnapshotError)
//!
//! # Example
//!
//! ```
//! use dashcfg_core::{decode_tabs, ConfigId};
//!
//! let config_id = ConfigId::new();
//! let tabs = decode_tabs(&serde_json::json!([
//!     {"id": "clients_tab", "label": "Clients", "icon": "users", "components": []}
//! ]))
//! .unwrap();
//!
//! assert_eq!(tabs.len(), 1);
//! assert!(!config_id.to_string().is_empty());
//! ```

pub mod error;
pub mod ids;
pub mod record;
pub mod snapshot;

pub use error::SnapshotError;
pub use ids::{ConfigId, OwnerId, ParseIdError, VersionId};
pub use record::{LiveConfiguration, VersionRecord};
pub use snapshot::{
    decode_colors, decode_tabs, encode_colors, encode_tabs, CardStyle, ColorPalette,
    PipelineConfig, PipelineStage, Tab, TabComponent, ViewType,
};
