use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::{
    access::{sufficient, GrantPlan},
    db::{
        self,
        task_access::{OrganizationGrantDetail, UserGrantDetail},
        User,
    },
    domain::{OrganizationId, TaskAccessLevel, TaskId, UserId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

#[derive(Debug, Deserialize)]
pub struct UserGrantInput {
    pub user_id: String,
    pub level: TaskAccessLevel,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationGrantInput {
    pub organization_id: String,
    pub level: TaskAccessLevel,
}

/// The complete set of grants a task should end up with.
#[derive(Debug, Deserialize)]
pub struct ReplaceGrantsRequest {
    #[serde(default)]
    pub users: Vec<UserGrantInput>,
    #[serde(default)]
    pub organizations: Vec<OrganizationGrantInput>,
}

#[derive(Debug, Serialize)]
pub struct GrantsResponse {
    pub users: Vec<UserGrantDetail>,
    pub organizations: Vec<OrganizationGrantDetail>,
}

/// PUT /api/tasks/:id/grants — Replace the task's grants with the submitted set.
/// Requires `Full`. Rows not submitted are removed.
pub async fn replace(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReplaceGrantsRequest>,
) -> Result<Json<GrantsResponse>, AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &id, TaskAccessLevel::Full).await?;
    let task_id = TaskId::from_string(&task.id)?;

    let mut desired_users = Vec::with_capacity(request.users.len());
    for grant in &request.users {
        let invalid = || AppError::Validation("Granted user not found".to_string());
        let user_id = UserId::from_string(&grant.user_id).map_err(|_| invalid())?;
        db::users::find_by_id(&state.db, &user_id).await?.ok_or_else(invalid)?;
        desired_users.push((user_id, grant.level));
    }
    let mut desired_orgs = Vec::with_capacity(request.organizations.len());
    for grant in &request.organizations {
        let invalid = || AppError::Validation("Granted organization not found".to_string());
        let organization_id = OrganizationId::from_string(&grant.organization_id).map_err(|_| invalid())?;
        db::organizations::find_by_id(&state.db, &organization_id)
            .await?
            .ok_or_else(invalid)?;
        desired_orgs.push((organization_id, grant.level));
    }

    let mut tx = state.db.begin().await?;
    let current_users = db::task_access::users_for_task(&mut *tx, &task_id)
        .await?
        .iter()
        .map(tenant::user_grant_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    let current_orgs = db::task_access::organizations_for_task(&mut *tx, &task_id)
        .await?
        .iter()
        .map(tenant::org_grant_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let plan = GrantPlan::between(&current_users, &current_orgs, &desired_users, &desired_orgs);
    for (user_id, level) in &plan.user_upserts {
        db::task_access::upsert_user(&mut *tx, &task_id, user_id, *level).await?;
    }
    for user_id in &plan.user_removals {
        db::task_access::delete_user(&mut *tx, &task_id, user_id).await?;
    }
    for (organization_id, level) in &plan.org_upserts {
        db::task_access::upsert_organization(&mut *tx, &task_id, organization_id, *level).await?;
    }
    for organization_id in &plan.org_removals {
        db::task_access::delete_organization(&mut *tx, &task_id, organization_id).await?;
    }

    let response = GrantsResponse {
        users: db::task_access::user_details_for_task(&mut *tx, &task_id).await?,
        organizations: db::task_access::organization_details_for_task(&mut *tx, &task_id).await?,
    };
    tx.commit().await?;

    if !plan.is_empty() {
        tracing::info!(
            task_id = %task_id,
            upserted = plan.user_upserts.len() + plan.org_upserts.len(),
            removed = plan.user_removals.len() + plan.org_removals.len(),
            "task grants replaced"
        );
    }
    Ok(Json(response))
}

/// GET /api/tasks/:id/grants/users
pub async fn list_users(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserGrantDetail>>, AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &id, TaskAccessLevel::View).await?;
    let task_id = TaskId::from_string(&task.id)?;
    Ok(Json(db::task_access::user_details_for_task(&state.db, &task_id).await?))
}

/// GET /api/tasks/:id/grants/organizations
pub async fn list_organizations(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrganizationGrantDetail>>, AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &id, TaskAccessLevel::View).await?;
    let task_id = TaskId::from_string(&task.id)?;
    Ok(Json(db::task_access::organization_details_for_task(&state.db, &task_id).await?))
}

/// GET /api/tasks/:id/authorized-users — Everyone who can edit the task: the
/// creator, users granted `Edit` or more, and users homed in an organization
/// granted `Edit` or more.
pub async fn authorized_users(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<User>>, AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &id, TaskAccessLevel::View).await?;
    let task_id = TaskId::from_string(&task.id)?;
    let grants = tenant::load_task_grants(&state.db, &task_id).await?;

    let mut user_ids: BTreeSet<UserId> = grants
        .user_grants(&task_id)
        .iter()
        .filter(|grant| sufficient(grant.level, TaskAccessLevel::Edit))
        .map(|grant| grant.user_id)
        .collect();
    if let Some(creator) = task.created_by.as_deref() {
        user_ids.insert(UserId::from_string(creator)?);
    }
    let organization_ids: Vec<OrganizationId> = grants
        .org_grants(&task_id)
        .iter()
        .filter(|grant| sufficient(grant.level, TaskAccessLevel::Edit))
        .map(|grant| grant.organization_id)
        .collect();

    let mut users = db::users::list_by_ids(&state.db, &user_ids.into_iter().collect::<Vec<_>>()).await?;
    for member in db::users::list_by_organizations(&state.db, &organization_ids).await? {
        if !users.iter().any(|known| known.id == member.id) {
            users.push(member);
        }
    }
    users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(users))
}
