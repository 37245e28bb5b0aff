use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, organizations::NewOrganization, Organization},
    domain::{CompanyId, OrgRole, OrganizationId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub company_id: Option<String>,
    pub parent_id: Option<String>,
}

/// POST /api/organizations — Create a node under a parent, or the company's root.
///
/// The one-root-per-company rule is a read-then-insert check; two concurrent
/// root creations for the same company can both pass it.
pub async fn create(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;
    let name = request.name.trim().to_string();
    let code = request.code.trim().to_string();
    if name.is_empty() || code.is_empty() {
        return Err(AppError::Validation("Name and code are required".to_string()));
    }

    let requested_company = request
        .company_id
        .as_deref()
        .map(CompanyId::from_string)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid company_id".to_string()))?;

    let (company_id, parent_id, level) = match request.parent_id.as_deref() {
        Some(parent_id) => {
            let parent = find_parent(&state.db, parent_id).await?;
            let parent =
                tenant::require_organization(&state.db, &user, &parent.id, OrgRole::OrgAdmin).await?;
            let company_id = CompanyId::from_string(&parent.company_id)?;
            if requested_company.is_some_and(|requested| requested != company_id) {
                return Err(AppError::Validation(
                    "Parent organization belongs to another company".to_string(),
                ));
            }
            (
                company_id,
                Some(OrganizationId::from_string(&parent.id)?),
                parent.level + 1,
            )
        }
        None => {
            let company_id = requested_company
                .ok_or_else(|| AppError::Validation("company_id is required for a root organization".to_string()))?;
            db::companies::find_by_id(&state.db, &company_id)
                .await?
                .ok_or_else(|| AppError::not_found("Company"))?;
            tenant::require_company_admin(&state.db, &user, &company_id).await?;
            if db::organizations::has_root(&state.db, &company_id).await? {
                return Err(AppError::Conflict("Company already has a root organization".to_string()));
            }
            (company_id, None, 1)
        }
    };

    if db::organizations::code_in_use(&state.db, &company_id, &code).await? {
        return Err(AppError::Conflict("Organization code already in use".to_string()));
    }

    let id = OrganizationId::new();
    db::organizations::insert(
        &state.db,
        &NewOrganization {
            id,
            name,
            code,
            company_id,
            parent_id,
            level,
        },
    )
    .await?;

    let organization = db::organizations::find_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::Internal)?;
    tracing::info!(organization_id = %id, %company_id, level, "organization created");
    Ok((StatusCode::CREATED, Json(organization)))
}

/// A parent that does not exist is bad input, not a missing resource.
async fn find_parent(pool: &sqlx::SqlitePool, parent_id: &str) -> Result<Organization, AppError> {
    let invalid = || AppError::Validation("Parent organization not found".to_string());
    let parent_id = OrganizationId::from_string(parent_id).map_err(|_| invalid())?;
    db::organizations::find_by_id(pool, &parent_id)
        .await?
        .ok_or_else(invalid)
}
