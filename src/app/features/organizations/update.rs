use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, Organization},
    domain::{CompanyId, OrgRole, OrganizationId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

/// Partial update. `parent_id: null` detaches the node to become its
/// company's root; omitting `parent_id` leaves the parent alone.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::app::features::present")]
    pub parent_id: Option<Option<String>>,
}

/// PATCH /api/organizations/:id — Rename and/or re-parent.
///
/// Re-parenting needs `OrgAdmin` on the node and on the new parent, and
/// recomputes `level` for the whole moved subtree.
pub async fn update(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, AppError> {
    let organization = tenant::require_organization(&state.db, &user, &id, OrgRole::OrgAdmin).await?;
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    let id = OrganizationId::from_string(&organization.id)?;
    let company_id = CompanyId::from_string(&organization.company_id)?;

    let name = match request.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Name is required".to_string())),
        other => other.map(str::to_string),
    };

    let move_to = match request.parent_id {
        None => None,
        Some(Some(parent_id)) => {
            let invalid = || AppError::Validation("Parent organization not found".to_string());
            let parent_id = OrganizationId::from_string(&parent_id).map_err(|_| invalid())?;
            let parent = db::organizations::find_by_id(&state.db, &parent_id)
                .await?
                .ok_or_else(invalid)?;
            if parent.company_id != organization.company_id {
                return Err(AppError::Validation(
                    "Parent organization belongs to another company".to_string(),
                ));
            }
            tenant::require_organization(&state.db, &user, &parent.id, OrgRole::OrgAdmin).await?;
            Some((Some(parent_id), parent.level + 1))
        }
        Some(None) => {
            tenant::require_company_admin(&state.db, &user, &company_id).await?;
            Some((None, 1))
        }
    };

    let mut tx = state.db.begin().await?;

    if let Some(name) = &name {
        db::organizations::update_name(&mut *tx, &id, name).await?;
    }

    if let Some((parent_id, level)) = move_to {
        let rows = db::organizations::list_by_company(&mut *tx, &company_id).await?;
        let tree = tenant::tree_from_rows(&rows)?;

        match parent_id {
            Some(parent_id) if tree.is_within(&parent_id, &id) => {
                return Err(AppError::Validation(
                    "Cannot move an organization under itself or its descendants".to_string(),
                ));
            }
            None if tree.roots(&company_id).iter().any(|root| root.id != id) => {
                return Err(AppError::Conflict("Company already has a root organization".to_string()));
            }
            _ => {}
        }

        db::organizations::update_parent(&mut *tx, &id, parent_id.as_ref()).await?;
        let levels = tree.relevel(&id, level);
        for (node, node_level) in &levels {
            db::organizations::update_level(&mut *tx, node, *node_level).await?;
        }
        tracing::info!(organization_id = %id, level, moved = levels.len(), "organization re-parented");
    }

    let updated = db::organizations::find_by_id(&mut *tx, &id)
        .await?
        .ok_or(AppError::Internal)?;
    tx.commit().await?;
    Ok(Json(updated))
}
