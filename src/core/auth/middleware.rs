//! Token verification for protected routes
//!
//! A bearer token is looked up in this order:
//! - `Authorization: Bearer <token>`
//! - `x-auth-token: <token>`
//! - the `shopfront_access_token` cookie
//!
//! API handlers take [`AuthenticatedAdmin`] / [`RequireSuperAdmin`] extractors
//! (401/403 JSON on failure). Dashboard pages sit behind [`protect_routes`],
//! which clears the cookie and redirects to the login page instead.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::core::auth::jwt::JwtService;
use crate::core::auth::service::{AuthError, VerifiedIdentity};

/// Custom header carrying the access token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";
/// Cookie carrying the access token for page requests
pub const ACCESS_TOKEN_COOKIE: &str = "shopfront_access_token";

/// Path prefixes that require a verified token
pub const PROTECTED_PREFIXES: [&str; 2] = ["/dashboard", "/admin"];
/// Paths that never require a token
pub const PUBLIC_PATHS: [&str; 2] = ["/", "/logout"];
/// Where rejected page requests are sent
pub const LOGIN_PATH: &str = "/";

// ============================================================================
// Token extraction
// ============================================================================

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    // The auth scheme is case-insensitive
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn custom_header_token(headers: &HeaderMap) -> Option<String> {
    let token = headers.get(AUTH_TOKEN_HEADER)?.to_str().ok()?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let token = jar.get(ACCESS_TOKEN_COOKIE)?.value().trim().to_string();
    (!token.is_empty()).then_some(token)
}

/// Find the access token in a request's headers
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers)
        .or_else(|| custom_header_token(headers))
        .or_else(|| cookie_token(headers))
}

// ============================================================================
// Per-request verification state machine
// ============================================================================

/// Verification state of a single request. Nothing survives the request.
#[derive(Debug)]
pub enum TokenCheck {
    NoToken,
    Present(String),
    Verified(VerifiedIdentity),
    Rejected(AuthError),
}

impl TokenCheck {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match extract_token(headers) {
            Some(token) => TokenCheck::Present(token),
            None => TokenCheck::NoToken,
        }
    }

    /// Advance to a terminal state
    pub fn verify(self, jwt: &JwtService) -> Self {
        match self {
            TokenCheck::NoToken => TokenCheck::Rejected(AuthError::MissingToken),
            TokenCheck::Present(token) => match jwt.validate_access_token(&token) {
                Ok(claims) => match VerifiedIdentity::try_from(claims) {
                    Ok(identity) => TokenCheck::Verified(identity),
                    Err(err) => TokenCheck::Rejected(err),
                },
                Err(err) => TokenCheck::Rejected(err.into()),
            },
            terminal => terminal,
        }
    }

    pub fn into_result(self) -> Result<VerifiedIdentity, AuthError> {
        match self {
            TokenCheck::Verified(identity) => Ok(identity),
            TokenCheck::Rejected(err) => Err(err),
            TokenCheck::NoToken => Err(AuthError::MissingToken),
            TokenCheck::Present(_) => Err(AuthError::InvalidToken),
        }
    }
}

/// Verify the request's token against the server secret
pub fn verify_request(headers: &HeaderMap, jwt: &JwtService) -> Result<VerifiedIdentity, AuthError> {
    TokenCheck::from_headers(headers).verify(jwt).into_result()
}

// ============================================================================
// Route matcher
// ============================================================================

fn under_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether a page path requires a verified token
pub fn requires_auth(path: &str) -> bool {
    if PUBLIC_PATHS.contains(&path) {
        return false;
    }
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| under_prefix(path, prefix))
}

// ============================================================================
// Cookies
// ============================================================================

/// Settings for the access-token cookie
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl CookieSettings {
    /// Session cookie carrying the access token; expiry is enforced by the
    /// token itself
    pub fn access_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((ACCESS_TOKEN_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

/// Cookie value that expires the access-token cookie
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE).path("/").build()
}

// ============================================================================
// Page middleware
// ============================================================================

/// Gate dashboard pages behind a verified token
///
/// Verified identities are attached to the request extensions for
/// downstream handlers; rejected requests lose their cookie and are
/// redirected to the login page.
pub async fn protect_routes(
    State(jwt): State<JwtService>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if !requires_auth(&path) {
        return next.run(req).await;
    }

    match TokenCheck::from_headers(req.headers()).verify(&jwt) {
        TokenCheck::Verified(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        rejected => {
            tracing::debug!(path = %path, state = ?rejected, "Rejected page request");
            (jar.remove(removal_cookie()), Redirect::to(LOGIN_PATH)).into_response()
        }
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// Identity of the admin behind a verified access token
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub VerifiedIdentity);

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
    JwtService: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<VerifiedIdentity>() {
            return Ok(AuthenticatedAdmin(identity.clone()));
        }

        let jwt = JwtService::from_ref(state);
        let identity = verify_request(&parts.headers, &jwt).inspect_err(|e| {
            tracing::debug!(error = %e, path = %parts.uri.path(), "Token verification failed");
        })?;

        parts.extensions.insert(identity.clone());
        Ok(AuthenticatedAdmin(identity))
    }
}

/// Verified identity whose role is `super_admin`
#[derive(Debug, Clone)]
pub struct RequireSuperAdmin(pub VerifiedIdentity);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
    JwtService: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedAdmin(identity) =
            AuthenticatedAdmin::from_request_parts(parts, state).await?;

        if !identity.role.is_super_admin() {
            return Err(AuthError::Forbidden);
        }

        Ok(RequireSuperAdmin(identity))
    }
}
