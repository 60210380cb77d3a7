//! Database repositories
//!
//! Repositories encapsulate data access and hand business logic plain
//! model structs.

pub mod admin;

pub use admin::{AdminRepository, AdminRepositoryError};
