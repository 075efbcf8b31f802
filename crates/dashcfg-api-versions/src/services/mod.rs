//! Business logic services for the Configuration Version API.

pub mod memory_store;
pub mod postgres_store;
pub mod restore_service;
pub mod retention;
pub mod store;

pub use memory_store::{FailingVersionStore, InMemoryVersionStore};
pub use postgres_store::PgVersionStore;
pub use restore_service::{RestoreService, RestoredConfig};
pub use retention::{RetentionPruner, DEFAULT_KEEP_COUNT};
pub use store::{StoreError, StoreResult, VersionStore, VersionTransaction};
