//! Database module
//!
//! PostgreSQL connectivity, models and repositories built on SQLx.

pub mod models;
pub mod pool;
pub mod repositories;

pub use models::*;
pub use pool::{DbConfig, DbError, create_pool, create_pool_with_migrations};
pub use repositories::{AdminRepository, AdminRepositoryError};

pub use sqlx::PgPool;
