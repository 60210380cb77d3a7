//! Admin management API endpoints
//!
//! - GET /api/admins - List admins (any authenticated admin)
//! - POST /api/admins - Create an admin (super admin)
//! - PATCH /api/admins/{id}/status - Toggle an admin's active flag (super admin)
//! - DELETE /api/admins/{id} - Delete an admin (super admin)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
};
use uuid::Uuid;

use crate::core::auth::api::JsonBody;
use crate::core::auth::middleware::{AuthenticatedAdmin, RequireSuperAdmin};
use crate::core::auth::service::{AuthError, VerifiedIdentity};
use crate::core::auth::store::CredentialStore;
use crate::core::protocol::{AdminListEntry, CreateAdminRequest, MessageResponse};
use crate::core::state::AppState;

/// Create the admin management router
pub fn admin_api_router<S>(state: AppState<S>) -> Router
where
    S: CredentialStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/admins", get(list_handler::<S>).post(create_handler::<S>))
        .route("/api/admins/{id}", delete(delete_handler::<S>))
        .route("/api/admins/{id}/status", patch(toggle_status_handler::<S>))
        .with_state(state)
}

/// The role in the token may be stale; the stored record decides.
async fn confirm_super_admin<S>(
    state: &AppState<S>,
    identity: &VerifiedIdentity,
) -> Result<(), AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let actor = state.auth.current_admin(identity).await?;
    if !actor.role.is_super_admin() {
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

/// GET /api/admins
async fn list_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedAdmin(_identity): AuthenticatedAdmin,
) -> Result<Json<Vec<AdminListEntry>>, AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let admins = state.auth.store().list().await?;
    Ok(Json(admins.into_iter().map(AdminListEntry::from).collect()))
}

/// POST /api/admins
async fn create_handler<S>(
    State(state): State<AppState<S>>,
    RequireSuperAdmin(identity): RequireSuperAdmin,
    JsonBody(request): JsonBody<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminListEntry>), AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    confirm_super_admin(&state, &identity).await?;

    let admin = state
        .auth
        .create_admin(
            &request.email,
            &request.password,
            &request.name,
            request.role,
            Some(identity.admin_id),
        )
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        role = %admin.role,
        created_by = %identity.admin_id,
        "Admin created"
    );

    Ok((StatusCode::CREATED, Json(admin.into())))
}

/// PATCH /api/admins/{id}/status
async fn toggle_status_handler<S>(
    State(state): State<AppState<S>>,
    RequireSuperAdmin(identity): RequireSuperAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminListEntry>, AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    if id == identity.admin_id {
        return Err(AuthError::CannotChangeOwnStatus);
    }
    confirm_super_admin(&state, &identity).await?;

    let store = state.auth.store();
    let target = store.find_by_id(id).await?.ok_or(AuthError::AdminNotFound)?;
    let updated = store.set_active(id, !target.is_active).await?;

    tracing::info!(
        admin_id = %id,
        is_active = updated.is_active,
        changed_by = %identity.admin_id,
        "Admin status changed"
    );

    Ok(Json(updated.into()))
}

/// DELETE /api/admins/{id}
async fn delete_handler<S>(
    State(state): State<AppState<S>>,
    RequireSuperAdmin(identity): RequireSuperAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    if id == identity.admin_id {
        return Err(AuthError::CannotDeleteSelf);
    }
    confirm_super_admin(&state, &identity).await?;

    if !state.auth.store().delete(id).await? {
        return Err(AuthError::AdminNotFound);
    }

    tracing::info!(admin_id = %id, deleted_by = %identity.admin_id, "Admin deleted");

    Ok(Json(MessageResponse::new("Admin deleted")))
}
