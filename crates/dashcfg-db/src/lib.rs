//! Database layer for dashcfg.
//!
//! Provides the connection pool, embedded migrations and the row models for
//! the append-only `config_versions` table and the externally owned
//! `dashboard_configs` table.
//!
//! # Example
//!
//! ```rust,ignore
//! use dashcfg_db::{run_migrations, DbPool};
//!
//! let pool = DbPool::connect("postgres://localhost/dashcfg").await?;
//! run_migrations(&pool).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
