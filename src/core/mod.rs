//! Core domain: admin authentication, session handling and product attributes

#[cfg(feature = "ssr")]
pub mod admins;
#[cfg(feature = "ssr")]
pub mod auth;
pub mod catalog;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod db;
pub mod protocol;
pub mod session;
#[cfg(feature = "ssr")]
pub mod state;

pub use protocol::*;
