use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    access::Principal,
    db::{self, companies::Company},
    domain::CompanyId,
    error::AppError,
    session::ActingUser,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

fn require_superuser(user: &Principal) -> Result<(), AppError> {
    if user.is_superuser {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, "company management requires a superuser");
        Err(AppError::denied())
    }
}

fn parse_id(id: &str) -> Result<CompanyId, AppError> {
    CompanyId::from_string(id).map_err(|_| AppError::not_found("Company"))
}

fn validated_name(request: &CompanyRequest) -> Result<String, AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(name.to_string())
}

/// POST /api/companies — Create a company.
pub async fn create(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Json(request): Json<CompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    require_superuser(&user)?;
    let name = validated_name(&request)?;

    if db::companies::name_in_use(&state.db, &name, None).await? {
        return Err(AppError::Conflict("Company name already in use".to_string()));
    }

    let id = CompanyId::new();
    db::companies::insert(&state.db, &db::companies::NewCompany { id, name }).await?;
    let company = db::companies::find_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::Internal)?;

    tracing::info!(company_id = %id, "company created");
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/companies — All live companies.
pub async fn list(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Company>>, AppError> {
    require_superuser(&user)?;
    Ok(Json(db::companies::list(&state.db).await?))
}

/// GET /api/companies/:id — One company; `?include_deleted=true` reaches soft-deleted rows.
pub async fn show(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ShowQuery>,
) -> Result<Json<Company>, AppError> {
    require_superuser(&user)?;
    let id = parse_id(&id)?;
    let company = if query.include_deleted {
        db::companies::find_by_id_with_deleted(&state.db, &id).await?
    } else {
        db::companies::find_by_id(&state.db, &id).await?
    };
    company.map(Json).ok_or_else(|| AppError::not_found("Company"))
}

/// PATCH /api/companies/:id — Rename a company.
pub async fn rename(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CompanyRequest>,
) -> Result<Json<Company>, AppError> {
    require_superuser(&user)?;
    let id = parse_id(&id)?;
    let name = validated_name(&request)?;

    db::companies::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Company"))?;
    if db::companies::name_in_use(&state.db, &name, Some(&id)).await? {
        return Err(AppError::Conflict("Company name already in use".to_string()));
    }

    db::companies::rename(&state.db, &id, &name).await?;
    let company = db::companies::find_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(company))
}

/// DELETE /api/companies/:id — Soft-delete a company and all its organizations.
pub async fn delete(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_superuser(&user)?;
    let id = parse_id(&id)?;

    let mut tx = state.db.begin().await?;
    db::companies::find_by_id(&mut *tx, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Company"))?;
    db::companies::set_deleted(&mut *tx, &id, true).await?;
    let organizations = db::organizations::delete_with_company(&mut *tx, &id).await?;
    tx.commit().await?;

    tracing::info!(company_id = %id, organizations, "company deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/companies/:id/restore — Undo a soft-delete. Only organizations the
/// company delete took down come back; ones deleted on their own stay deleted.
pub async fn restore(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Company>, AppError> {
    require_superuser(&user)?;
    let id = parse_id(&id)?;

    let mut tx = state.db.begin().await?;
    let company = db::companies::find_by_id_with_deleted(&mut *tx, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Company"))?;
    if company.deleted {
        if db::companies::name_in_use(&mut *tx, &company.name, Some(&id)).await? {
            return Err(AppError::Conflict("Company name already in use".to_string()));
        }
        db::companies::set_deleted(&mut *tx, &id, false).await?;
        let organizations = db::organizations::restore_with_company(&mut *tx, &id).await?;
        tracing::info!(company_id = %id, organizations, "company restored");
    }
    let company = db::companies::find_by_id(&mut *tx, &id)
        .await?
        .ok_or(AppError::Internal)?;
    tx.commit().await?;
    Ok(Json(company))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/companies", post(create).get(list))
        .route("/api/companies/:id", get(show).patch(rename).delete(delete))
        .route("/api/companies/:id/restore", post(restore))
}
