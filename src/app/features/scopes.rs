use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    access::Principal,
    db::{self, access_scopes::AccessScope, access_scopes::NewAccessScope},
    domain::{OrgRole, OrganizationId, UserId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

use super::users::require_managed_user;

#[derive(Debug, Deserialize)]
pub struct ScopeRequest {
    /// Omit to anchor the scope at the user's home organization.
    pub organization_id: Option<String>,
    pub role: OrgRole,
}

/// The organization a scope applies to, resolved against the holder's home.
fn anchor(organization_id: Option<&str>, home: Option<&str>) -> Result<String, AppError> {
    organization_id
        .or(home)
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("User has no home organization".to_string()))
}

/// `OrgAdmin` over the anchor is needed to manage a scope there, and
/// `SystemAdmin` to hand out or take away `SystemAdmin`.
async fn require_scope_admin(
    pool: &sqlx::SqlitePool,
    actor: &Principal,
    organization_id: &str,
    role: OrgRole,
) -> Result<(), AppError> {
    let required = if role == OrgRole::SystemAdmin {
        OrgRole::SystemAdmin
    } else {
        OrgRole::OrgAdmin
    };
    tenant::require_organization(pool, actor, organization_id, required).await?;
    Ok(())
}

/// GET /api/users/:id/scopes
pub async fn list(
    ActingUser(actor): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AccessScope>>, AppError> {
    let user = require_managed_user(&state.db, &actor, &id).await?;
    let user_id = UserId::from_string(&user.id)?;
    Ok(Json(db::access_scopes::find_by_user(&state.db, &user_id).await?))
}

/// PUT /api/users/:id/scopes — Set the role a user holds at one organization,
/// creating the scope if needed.
pub async fn upsert(
    ActingUser(actor): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ScopeRequest>,
) -> Result<Json<AccessScope>, AppError> {
    let user_id = UserId::from_string(&id).map_err(|_| AppError::not_found("User"))?;
    let user = db::users::find_by_id(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let target = anchor(request.organization_id.as_deref(), user.organization_id.as_deref())?;
    require_scope_admin(&state.db, &actor, &target, request.role).await?;

    let organization_id = request
        .organization_id
        .as_deref()
        .map(OrganizationId::from_string)
        .transpose()?;

    let mut tx = state.db.begin().await?;
    let scope_id = match db::access_scopes::update_role(&mut *tx, &user_id, organization_id.as_ref(), request.role)
        .await?
    {
        Some(id) => id,
        None => {
            let id = ulid::Ulid::new().to_string();
            db::access_scopes::insert(
                &mut *tx,
                &NewAccessScope {
                    id: id.clone(),
                    user_id,
                    organization_id,
                    role: request.role,
                },
            )
            .await?;
            id
        }
    };
    let scope = db::access_scopes::find_by_id(&mut *tx, &scope_id)
        .await?
        .ok_or(AppError::Internal)?;
    tx.commit().await?;

    tracing::info!(user_id = %user_id, organization_id = %target, role = %request.role, "scope saved");
    Ok(Json(scope))
}

/// DELETE /api/scopes/:id
pub async fn remove(
    ActingUser(actor): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = db::access_scopes::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Scope"))?;
    let holder = db::users::find_by_id(&state.db, &UserId::from_string(&scope.user_id)?)
        .await?
        .ok_or(AppError::Internal)?;

    let target = anchor(scope.organization_id.as_deref(), holder.organization_id.as_deref())?;
    let role: OrgRole = scope.role.parse()?;
    require_scope_admin(&state.db, &actor, &target, role).await?;

    db::access_scopes::delete(&state.db, &scope.id).await?;
    tracing::info!(scope_id = %scope.id, "scope removed");
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:id/scopes", get(list).put(upsert))
        .route("/api/scopes/:id", delete(remove))
}
