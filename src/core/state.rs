//! Shared server state and the combined API router

use std::sync::Arc;

use axum::{Router, extract::FromRef};

use crate::core::admins::admin_api_router;
use crate::core::auth::api::auth_api_router;
use crate::core::auth::jwt::JwtService;
use crate::core::auth::middleware::CookieSettings;
use crate::core::auth::service::AuthService;
use crate::core::auth::store::CredentialStore;
use crate::core::catalog::{ProductTypeRegistry, catalog_api_router};

pub struct AppState<S> {
    pub auth: AuthService<S>,
    pub cookies: CookieSettings,
    pub catalog: Arc<ProductTypeRegistry>,
}

impl<S> AppState<S> {
    pub fn new(auth: AuthService<S>, cookies: CookieSettings, catalog: ProductTypeRegistry) -> Self {
        Self {
            auth,
            cookies,
            catalog: Arc::new(catalog),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            cookies: self.cookies,
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<S> FromRef<AppState<S>> for JwtService {
    fn from_ref(state: &AppState<S>) -> Self {
        state.auth.jwt().clone()
    }
}

/// Every JSON endpoint: auth, admin management and catalog
pub fn api_router<S>(state: AppState<S>) -> Router
where
    S: CredentialStore + Send + Sync + 'static,
{
    Router::new()
        .merge(auth_api_router(state.clone()))
        .merge(admin_api_router(state.clone()))
        .merge(catalog_api_router(state))
}
