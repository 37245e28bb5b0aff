use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::app::{
    db,
    domain::{TaskAccessLevel, TaskId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

/// DELETE /api/tasks/:id — Requires `Full`. Grants and personal-order rows go
/// first, then the task is soft-deleted, all in one transaction.
pub async fn delete(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &id, TaskAccessLevel::Full).await?;
    let task_id = TaskId::from_string(&task.id)?;

    let mut tx = state.db.begin().await?;
    let users = db::task_access::delete_users_for_task(&mut *tx, &task_id).await?;
    let organizations = db::task_access::delete_organizations_for_task(&mut *tx, &task_id).await?;
    db::task_orders::delete_for_task(&mut *tx, &task_id).await?;
    db::tasks::soft_delete(&mut *tx, &task_id).await?;
    tx.commit().await?;

    tracing::info!(task_id = %task_id, user_grants = users, organization_grants = organizations, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}
