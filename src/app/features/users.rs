use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    access::Principal,
    db::{self, access_scopes::NewAccessScope, NewUser, User},
    domain::{CompanyId, Email, OrgRole, OrganizationId, UserId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 3, max = 254))]
    pub email: String,
    pub organization_id: String,
    #[serde(default)]
    pub role: Option<OrgRole>,
}

/// Load a user the acting user may administer: themselves, or anyone homed in
/// an organization they hold `OrgAdmin` over. Users without a home
/// organization are visible to superusers only.
pub(crate) async fn require_managed_user(
    pool: &sqlx::SqlitePool,
    actor: &Principal,
    user_id: &str,
) -> Result<User, AppError> {
    let id = UserId::from_string(user_id).map_err(|_| AppError::not_found("User"))?;
    let user = db::users::find_by_id(pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    if actor.id == id || actor.is_superuser {
        return Ok(user);
    }
    match &user.organization_id {
        Some(home) => {
            tenant::require_organization(pool, actor, home, OrgRole::OrgAdmin).await?;
            Ok(user)
        }
        None => Err(AppError::denied()),
    }
}

/// POST /api/users — Create a user in an organization the actor administers,
/// together with their initial scope there.
pub async fn create(
    ActingUser(actor): ActingUser,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;
    let email = Email::new(&request.email)
        .map_err(|_| AppError::Validation("Invalid email".to_string()))?;
    let role = request.role.unwrap_or(OrgRole::Member);

    let home = tenant::require_organization(&state.db, &actor, &request.organization_id, OrgRole::OrgAdmin).await?;
    let home_id = OrganizationId::from_string(&home.id)?;
    if role == OrgRole::SystemAdmin {
        tenant::require_company_admin(&state.db, &actor, &CompanyId::from_string(&home.company_id)?).await?;
    }

    if db::users::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let id = UserId::new();
    let mut tx = state.db.begin().await?;
    db::users::insert(
        &mut *tx,
        &NewUser {
            id,
            name: request.name.trim().to_string(),
            email,
            organization_id: Some(home_id),
            is_superuser: false,
        },
    )
    .await?;
    db::access_scopes::insert(
        &mut *tx,
        &NewAccessScope {
            id: ulid::Ulid::new().to_string(),
            user_id: id,
            organization_id: Some(home_id),
            role,
        },
    )
    .await?;
    let user = db::users::find_by_id(&mut *tx, &id)
        .await?
        .ok_or(AppError::Internal)?;
    tx.commit().await?;

    tracing::info!(user_id = %id, organization_id = %home_id, %role, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id
pub async fn show(
    ActingUser(actor): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(require_managed_user(&state.db, &actor, &id).await?))
}

/// GET /api/organizations/:id/users — Users homed anywhere in the subtree.
pub async fn list_in_subtree(
    ActingUser(actor): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<User>>, AppError> {
    let root = tenant::require_organization(&state.db, &actor, &id, OrgRole::OrgAdmin).await?;
    let root_id = OrganizationId::from_string(&root.id)?;
    let company_id = CompanyId::from_string(&root.company_id)?;

    let tree = tenant::load_tree(&state.db, Some(&company_id)).await?;
    let subtree: Vec<OrganizationId> = tree.descendants(&root_id).into_iter().collect();
    Ok(Json(db::users::list_by_organizations(&state.db, &subtree).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(create))
        .route("/api/users/:id", get(show))
        .route("/api/organizations/:id/users", get(list_in_subtree))
}
