//! Catalog API endpoints
//!
//! - GET /api/catalog/types - List product type schemas
//! - POST /api/catalog/types/{type}/validate - Check an attribute bag

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Map, Value};

use crate::core::auth::api::JsonBody;
use crate::core::auth::middleware::AuthenticatedAdmin;
use crate::core::auth::store::CredentialStore;
use crate::core::catalog::registry::{AttributeError, AttributeSchema, ProductAttributes};
use crate::core::protocol::ApiError;
use crate::core::state::AppState;

impl IntoResponse for AttributeError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AttributeError::UnknownProductType(_) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_PRODUCT_TYPE")
            }
            AttributeError::UnknownField { .. } => (StatusCode::BAD_REQUEST, "UNKNOWN_ATTRIBUTE"),
            AttributeError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_ATTRIBUTE"),
            AttributeError::WrongKind { .. } => (StatusCode::BAD_REQUEST, "WRONG_ATTRIBUTE_KIND"),
            AttributeError::OptionNotAllowed { .. } => {
                (StatusCode::BAD_REQUEST, "OPTION_NOT_ALLOWED")
            }
            AttributeError::OutOfRange(_) => (StatusCode::BAD_REQUEST, "OUT_OF_RANGE"),
            AttributeError::TooLong { .. } => (StatusCode::BAD_REQUEST, "TOO_LONG"),
            AttributeError::InvalidConfig(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_CONFIG")
            }
        };

        (status, Json(ApiError::new(self.to_string(), code))).into_response()
    }
}

/// Create the catalog router
pub fn catalog_api_router<S>(state: AppState<S>) -> Router
where
    S: CredentialStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/catalog/types", get(list_types_handler::<S>))
        .route(
            "/api/catalog/types/{product_type}/validate",
            post(validate_handler::<S>),
        )
        .with_state(state)
}

/// GET /api/catalog/types
async fn list_types_handler<S>(
    State(state): State<AppState<S>>,
    _admin: AuthenticatedAdmin,
) -> Json<BTreeMap<String, AttributeSchema>> {
    Json(state.catalog.schemas().clone())
}

/// POST /api/catalog/types/{product_type}/validate
async fn validate_handler<S>(
    State(state): State<AppState<S>>,
    _admin: AuthenticatedAdmin,
    Path(product_type): Path<String>,
    JsonBody(attributes): JsonBody<Map<String, Value>>,
) -> Result<Json<ProductAttributes>, AttributeError> {
    let validated = state
        .catalog
        .validate(&product_type, &attributes)
        .inspect_err(|e| tracing::debug!(product_type = %product_type, error = %e, "Attribute validation failed"))?;

    Ok(Json(validated))
}
