//! Auth API endpoints
//!
//! Provides REST API endpoints for admin authentication:
//! - POST /auth/login - Login, get tokens and the access-token cookie
//! - GET /auth/me - Get current admin from the access token
//! - POST /auth/refresh - Exchange a refresh token for a new access token
//! - POST /auth/logout - Expire the access-token cookie

use axum::{
    Json, Router,
    extract::{FromRequest, Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;

use crate::core::auth::middleware::{AuthenticatedAdmin, removal_cookie};
use crate::core::auth::service::AuthError;
use crate::core::auth::store::CredentialStore;
use crate::core::protocol::{
    AdminSummary, ApiError, LoginRequest, LoginResponse, MessageResponse, RefreshRequest,
    RefreshResponse,
};
use crate::core::state::AppState;

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::AccountInactive | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::AdminNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::CannotDeleteSelf
            | AuthError::CannotChangeOwnStatus
            | AuthError::PasswordTooShort
            | AuthError::PasswordTooWeak
            | AuthError::InvalidEmail
            | AuthError::InvalidName
            | AuthError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountInactive => "ACCOUNT_INACTIVE",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::AdminNotFound => "ADMIN_NOT_FOUND",
            AuthError::EmailAlreadyExists => "EMAIL_EXISTS",
            AuthError::CannotDeleteSelf => "CANNOT_DELETE_SELF",
            AuthError::CannotChangeOwnStatus => "CANNOT_CHANGE_OWN_STATUS",
            AuthError::PasswordTooShort => "PASSWORD_TOO_SHORT",
            AuthError::PasswordTooWeak => "PASSWORD_TOO_WEAK",
            AuthError::InvalidEmail => "INVALID_EMAIL",
            AuthError::InvalidName => "INVALID_NAME",
            AuthError::MalformedBody(_) => "VALIDATION_ERROR",
            AuthError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AuthError::InternalError(detail) => {
                tracing::error!(error = %detail, "Internal error while handling auth request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(ApiError::new(message, self.code()))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// JSON body whose rejection is reported in the API error format
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AuthError::MalformedBody(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// Create the auth API router
pub fn auth_api_router<S>(state: AppState<S>) -> Router
where
    S: CredentialStore + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/login", post(login_handler::<S>))
        .route("/auth/me", get(me_handler::<S>))
        .route("/auth/refresh", post(refresh_handler::<S>))
        .route("/auth/logout", post(logout_handler))
        .with_state(state)
}

/// POST /auth/login
async fn login_handler<S>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    tracing::info!(email = %request.email, "Login attempt");

    let outcome = state
        .auth
        .login(&request.email, &request.password)
        .await
        .inspect_err(|e| tracing::info!(email = %request.email, error = %e, "Login rejected"))?;

    tracing::info!(admin_id = %outcome.admin.id, "Admin logged in");

    let tokens = outcome.tokens;
    let jar = jar.add(state.cookies.access_cookie(tokens.access_token.clone()));

    Ok((
        jar,
        Json(LoginResponse {
            admin: outcome.admin,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_expires_at: tokens.access_expires_at,
            refresh_expires_at: tokens.refresh_expires_at,
        }),
    ))
}

/// GET /auth/me
async fn me_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedAdmin(identity): AuthenticatedAdmin,
) -> Result<Json<AdminSummary>, AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let admin = state.auth.current_admin(&identity).await?;
    Ok(Json(admin))
}

/// POST /auth/refresh
async fn refresh_handler<S>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> Result<(CookieJar, Json<RefreshResponse>), AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    tracing::debug!("Token refresh request");

    let (access_token, access_expires_at) = state
        .auth
        .refresh(&request.refresh_token)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "Token refresh rejected"))?;

    let jar = jar.add(state.cookies.access_cookie(access_token.clone()));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token,
            access_expires_at,
        }),
    ))
}

/// POST /auth/logout
///
/// Tokens are stateless; logging out only expires the cookie. Always succeeds.
async fn logout_handler(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    tracing::debug!("Logout request");
    (
        jar.remove(removal_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountInactive.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::EmailAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::CannotDeleteSelf.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InternalError("db down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = AuthError::CannotDeleteSelf.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "CANNOT_DELETE_SELF");
        assert_eq!(json["error"], "Admins cannot delete their own account");
    }

    #[tokio::test]
    async fn test_unauthorized_sets_www_authenticate() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_internal_error_detail_is_hidden() {
        let response = AuthError::InternalError("connection refused".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert!(!json["error"].as_str().unwrap().contains("connection refused"));
    }
}
