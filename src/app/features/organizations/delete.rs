use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::app::{
    db,
    domain::{OrgRole, OrganizationId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

/// DELETE /api/organizations/:id — Soft-delete a leaf organization.
/// Fails with `Conflict` while any live organization still has it as parent.
pub async fn delete(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let organization = tenant::require_organization(&state.db, &user, &id, OrgRole::OrgAdmin).await?;
    let id = OrganizationId::from_string(&organization.id)?;

    let mut tx = state.db.begin().await?;
    if db::organizations::has_children(&mut *tx, &id).await? {
        return Err(AppError::Conflict(
            "Organization still has child organizations".to_string(),
        ));
    }
    db::organizations::soft_delete(&mut *tx, &id).await?;
    tx.commit().await?;

    tracing::info!(organization_id = %id, "organization deleted");
    Ok(StatusCode::NO_CONTENT)
}
