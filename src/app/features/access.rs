use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::app::{
    domain::{CompanyId, OrganizationId},
    error::AppError,
    session::ActingUser,
    tenant::{self, AccessRequest, TargetKind},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
}

/// POST /api/authorize — Ask whether the acting user may act on a target.
pub async fn authorize(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Json(request): Json<AccessRequest>,
) -> Result<Json<AuthorizeResponse>, AppError> {
    let allowed = tenant::authorize(&state.db, &user, &request).await?;
    Ok(Json(AuthorizeResponse { allowed }))
}

#[derive(Debug, Deserialize)]
pub struct VisibleQuery {
    pub kind: TargetKind,
    pub company_id: Option<String>,
    pub organization_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VisibleResponse {
    pub kind: TargetKind,
    pub ids: Vec<String>,
}

/// GET /api/visible?kind=organization|task — IDs the acting user may see.
pub async fn visible(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Query(query): Query<VisibleQuery>,
) -> Result<Json<VisibleResponse>, AppError> {
    let company_id = query
        .company_id
        .as_deref()
        .map(CompanyId::from_string)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid company_id".to_string()))?;
    let organization_id = query
        .organization_id
        .as_deref()
        .map(OrganizationId::from_string)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid organization_id".to_string()))?;

    let ids = tenant::list_visible_ids(
        &state.db,
        &user,
        query.kind,
        company_id.as_ref(),
        organization_id.as_ref(),
    )
    .await?;
    Ok(Json(VisibleResponse { kind: query.kind, ids }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/authorize", post(authorize))
        .route("/api/visible", get(visible))
}
