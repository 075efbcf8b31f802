//! Row models for dashcfg tables.

pub mod config_version;
pub mod dashboard_config;

pub use config_version::{ConfigVersion, MAX_VERSION_INSERT_ATTEMPTS};
pub use dashboard_config::DashboardConfig;
