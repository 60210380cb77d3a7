//! Admin management
//!
//! REST endpoints over the credential-record lifecycle: listing, creation by
//! a super admin, status toggling and deletion. An admin can never toggle or
//! delete their own record.

pub mod api;

pub use api::admin_api_router;
