//! Admin authentication
//!
//! - HS256 JWT access/refresh token issuance and validation
//! - Credential validation against the admin credential store
//! - Request verification for protected pages and API routes
//! - REST API endpoints for login, refresh, current admin and logout

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use api::{JsonBody, auth_api_router};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenPair, TokenType};
pub use middleware::{
    AuthenticatedAdmin, CookieSettings, RequireSuperAdmin, TokenCheck, protect_routes,
    requires_auth,
};
pub use service::{AuthError, AuthService, LoginOutcome, VerifiedIdentity};
pub use store::{CredentialStore, MemoryCredentialStore};
