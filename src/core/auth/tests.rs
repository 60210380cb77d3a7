//! End-to-end tests for the auth, admin and catalog routers
//!
//! Requests go through the real axum routers in-process against an
//! in-memory credential store.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    middleware::from_fn_with_state,
    response::Response,
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::core::auth::jwt::{JwtConfig, JwtService};
use crate::core::auth::middleware::{ACCESS_TOKEN_COOKIE, CookieSettings, protect_routes};
use crate::core::auth::service::AuthService;
use crate::core::auth::store::{CredentialStore, MemoryCredentialStore};
use crate::core::catalog::ProductTypeRegistry;
use crate::core::protocol::AdminRole;
use crate::core::state::{AppState, api_router};

const SECRET: &str = "http_test_secret";
const PASSWORD: &str = "Password1";

struct TestApp {
    router: Router,
    state: AppState<MemoryCredentialStore>,
    owner_id: Uuid,
    staff_id: Uuid,
}

async fn app() -> TestApp {
    let auth = AuthService::new(
        Arc::new(MemoryCredentialStore::new()),
        JwtService::new(JwtConfig::new(SECRET)),
    );
    let owner = auth
        .create_admin("owner@shop.test", PASSWORD, "Owner", AdminRole::SuperAdmin, None)
        .await
        .unwrap();
    let staff = auth
        .create_admin("staff@shop.test", PASSWORD, "Staff", AdminRole::Admin, Some(owner.id))
        .await
        .unwrap();

    let state = AppState::new(
        auth,
        CookieSettings { secure: false },
        ProductTypeRegistry::builtin().unwrap(),
    );

    TestApp {
        router: api_router(state.clone()),
        state,
        owner_id: owner.id,
        staff_id: staff.id,
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn cookie_request(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("{ACCESS_TOKEN_COOKIE}={token}"))
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn login(router: &Router, email: &str) -> Value {
    let response = send(
        router,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": email, "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn access_token(router: &Router, email: &str) -> String {
    login(router, email).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string()
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_returns_tokens_and_cookie() {
    let app = app().await;

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "owner@shop.test", "password": PASSWORD}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with(&format!("{ACCESS_TOKEN_COOKIE}=")));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["admin"]["email"], "owner@shop.test");
    assert_eq!(body["admin"]["role"], "super_admin");
    assert!(body["admin"].get("passwordHash").is_none());
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
    assert!(body["accessExpiresAt"].as_i64().unwrap() < body["refreshExpiresAt"].as_i64().unwrap());
}

#[tokio::test]
async fn test_login_failures_share_one_response() {
    let app = app().await;

    let wrong = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "owner@shop.test", "password": "Wrong1234"}),
        ),
    )
    .await;
    let unknown = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "ghost@shop.test", "password": PASSWORD}),
        ),
    )
    .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let wrong = body_json(wrong).await;
    let unknown = body_json(unknown).await;
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = app().await;

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "owner@shop.test"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_inactive_account() {
    let app = app().await;
    app.state
        .auth
        .store()
        .set_active(app.staff_id, false)
        .await
        .unwrap();

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "staff@shop.test", "password": PASSWORD}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "ACCOUNT_INACTIVE");
}

// ============================================================================
// Current admin / verification
// ============================================================================

#[tokio::test]
async fn test_me_with_bearer_token() {
    let app = app().await;
    let token = access_token(&app.router, "staff@shop.test").await;

    let response = send(&app.router, empty_request(Method::GET, "/auth/me", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], app.staff_id.to_string());
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn test_me_with_cookie() {
    let app = app().await;
    let token = access_token(&app.router, "staff@shop.test").await;

    let request = Request::builder()
        .uri("/auth/me")
        .header(header::COOKIE, format!("{ACCESS_TOKEN_COOKIE}={token}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_without_token() {
    let app = app().await;

    let response = send(&app.router, empty_request(Method::GET, "/auth/me", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let app = app().await;
    let expired = JwtService::new(JwtConfig::new(SECRET).access_token_expiration(-1));
    let (token, _) = expired
        .generate_access_token(app.staff_id, "staff@shop.test", AdminRole::Admin)
        .unwrap();

    let response = send(&app.router, empty_request(Method::GET, "/auth/me", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_me_with_foreign_signature() {
    let app = app().await;
    let foreign = JwtService::new(JwtConfig::new("someone_elses_secret"));
    let (token, _) = foreign
        .generate_access_token(app.owner_id, "owner@shop.test", AdminRole::SuperAdmin)
        .unwrap();

    let response = send(&app.router, empty_request(Method::GET, "/auth/me", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_refresh_token_rejected_as_access_token() {
    let app = app().await;
    let session = login(&app.router, "staff@shop.test").await;
    let refresh = session["refreshToken"].as_str().unwrap();

    let response = send(&app.router, empty_request(Method::GET, "/auth/me", Some(refresh))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Refresh / logout
// ============================================================================

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let app = app().await;
    let session = login(&app.router, "staff@shop.test").await;

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/refresh",
            None,
            json!({"refreshToken": session["refreshToken"]}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).starts_with(ACCESS_TOKEN_COOKIE));
    let body = body_json(response).await;
    let token = body["accessToken"].as_str().unwrap();
    assert!(body["accessExpiresAt"].is_i64());

    let me = send(&app.router, empty_request(Method::GET, "/auth/me", Some(token))).await;
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = app().await;
    let session = login(&app.router, "staff@shop.test").await;

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/refresh",
            None,
            json!({"refreshToken": session["accessToken"]}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_logout_is_idempotent_and_expires_cookie() {
    let app = app().await;
    let token = access_token(&app.router, "staff@shop.test").await;

    for _ in 0..2 {
        let request = cookie_request(Method::POST, "/auth/logout", &token);
        let response = send(&app.router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie(&response);
        assert!(cookie.starts_with(&format!("{ACCESS_TOKEN_COOKIE}=;")));
        assert!(cookie.contains("Max-Age=0"));
    }

    // Nothing to expire without a cookie, but still a success
    let response = send(&app.router, empty_request(Method::POST, "/auth/logout", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_empty());
    assert_eq!(body_json(response).await["message"], "Logged out successfully");
}

// ============================================================================
// Admin management
// ============================================================================

#[tokio::test]
async fn test_list_admins_requires_token() {
    let app = app().await;

    let anonymous = send(&app.router, empty_request(Method::GET, "/api/admins", None)).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let token = access_token(&app.router, "staff@shop.test").await;
    let response = send(&app.router, empty_request(Method::GET, "/api/admins", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let admins = body.as_array().unwrap();
    assert_eq!(admins.len(), 2);
    assert!(admins.iter().all(|a| a["isActive"] == true));
}

#[tokio::test]
async fn test_super_admin_creates_admin() {
    let app = app().await;
    let token = access_token(&app.router, "owner@shop.test").await;

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/admins",
            Some(&token),
            json!({"email": "New@Shop.test", "password": PASSWORD, "name": "New"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "new@shop.test");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["createdBy"], app.owner_id.to_string());
}

#[tokio::test]
async fn test_regular_admin_cannot_create() {
    let app = app().await;
    let token = access_token(&app.router, "staff@shop.test").await;

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/admins",
            Some(&token),
            json!({"email": "new@shop.test", "password": PASSWORD, "name": "New"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_create_admin_weak_password() {
    let app = app().await;
    let token = access_token(&app.router, "owner@shop.test").await;

    let response = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/admins",
            Some(&token),
            json!({"email": "new@shop.test", "password": "password", "name": "New"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "PASSWORD_TOO_WEAK");
}

#[tokio::test]
async fn test_cannot_delete_self() {
    let app = app().await;
    let token = access_token(&app.router, "owner@shop.test").await;

    let response = send(
        &app.router,
        empty_request(
            Method::DELETE,
            &format!("/api/admins/{}", app.owner_id),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CANNOT_DELETE_SELF");
    assert!(app.state.auth.store().find_by_id(app.owner_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_cannot_toggle_own_status() {
    let app = app().await;
    let token = access_token(&app.router, "owner@shop.test").await;

    let response = send(
        &app.router,
        empty_request(
            Method::PATCH,
            &format!("/api/admins/{}/status", app.owner_id),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CANNOT_CHANGE_OWN_STATUS");
}

#[tokio::test]
async fn test_toggle_status_blocks_login_and_refresh() {
    let app = app().await;
    let staff_session = login(&app.router, "staff@shop.test").await;
    let token = access_token(&app.router, "owner@shop.test").await;

    let response = send(
        &app.router,
        empty_request(
            Method::PATCH,
            &format!("/api/admins/{}/status", app.staff_id),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isActive"], false);

    let refresh = send(
        &app.router,
        json_request(
            Method::POST,
            "/auth/refresh",
            None,
            json!({"refreshToken": staff_session["refreshToken"]}),
        ),
    )
    .await;
    assert_eq!(refresh.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(refresh).await["code"], "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_delete_admin() {
    let app = app().await;
    let token = access_token(&app.router, "owner@shop.test").await;
    let uri = format!("/api/admins/{}", app.staff_id);

    let first = send(&app.router, empty_request(Method::DELETE, &uri, Some(&token))).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(&app.router, empty_request(Method::DELETE, &uri, Some(&token))).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(second).await["code"], "ADMIN_NOT_FOUND");
}

#[tokio::test]
async fn test_demoted_token_role_is_rechecked() {
    let app = app().await;
    // Token claims super_admin, but the stored record is a plain admin
    let (token, _) = app
        .state
        .auth
        .jwt()
        .generate_access_token(app.staff_id, "staff@shop.test", AdminRole::SuperAdmin)
        .unwrap();

    let response = send(
        &app.router,
        empty_request(
            Method::DELETE,
            &format!("/api/admins/{}", app.owner_id),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_types_listed() {
    let app = app().await;
    let token = access_token(&app.router, "staff@shop.test").await;

    let response = send(
        &app.router,
        empty_request(Method::GET, "/api/catalog/types", Some(&token)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["clothing"]["label"], "Clothing");
}

#[tokio::test]
async fn test_catalog_validate() {
    let app = app().await;
    let token = access_token(&app.router, "staff@shop.test").await;

    let ok = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/catalog/types/clothing/validate",
            Some(&token),
            json!({"size": "L", "color": "olive"}),
        ),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body = body_json(ok).await;
    assert_eq!(body["productType"], "clothing");
    assert_eq!(body["values"]["size"], "L");

    let bad = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/catalog/types/clothing/validate",
            Some(&token),
            json!({"size": "XXXL", "color": "olive"}),
        ),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad).await["code"], "OPTION_NOT_ALLOWED");
}

// ============================================================================
// Page protection
// ============================================================================

fn page_router(jwt: JwtService) -> Router {
    Router::new()
        .route("/", get(|| async { "login" }))
        .route("/logout", get(|| async { "bye" }))
        .route("/dashboard", get(|| async { "dashboard" }))
        .route("/dashboard/admins", get(|| async { "admins" }))
        .layer(from_fn_with_state(jwt, protect_routes))
}

#[tokio::test]
async fn test_dashboard_without_token_redirects() {
    let app = app().await;
    let pages = page_router(app.state.auth.jwt().clone());

    let response = send(&pages, empty_request(Method::GET, "/dashboard/admins", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_dashboard_with_bad_cookie_redirects_and_clears_it() {
    let app = app().await;
    let pages = page_router(app.state.auth.jwt().clone());

    let response = send(&pages, cookie_request(Method::GET, "/dashboard", "not-a-jwt")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with(&format!("{ACCESS_TOKEN_COOKIE}=;")));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_dashboard_with_cookie_passes() {
    let app = app().await;
    let pages = page_router(app.state.auth.jwt().clone());
    let token = access_token(&app.router, "staff@shop.test").await;

    let response = send(&pages, cookie_request(Method::GET, "/dashboard", &token)).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_pages_skip_verification() {
    let app = app().await;
    let pages = page_router(app.state.auth.jwt().clone());

    for path in ["/", "/logout"] {
        let response = send(&pages, empty_request(Method::GET, path, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
}
