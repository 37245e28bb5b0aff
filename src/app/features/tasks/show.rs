use axum::{
    extract::{Path, State},
    Json,
};

use crate::app::{
    domain::TaskAccessLevel,
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

use super::TaskView;

/// GET /api/tasks/:id
pub async fn show(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskView>, AppError> {
    let (task, effective_level) = tenant::require_task(&state.db, &user, &id, TaskAccessLevel::View).await?;
    Ok(Json(TaskView { task, effective_level }))
}

/// GET /api/tasks — Visible tasks in the user's personal order.
pub async fn list(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskView>>, AppError> {
    let tasks = tenant::list_visible_tasks(&state.db, &user)
        .await?
        .into_iter()
        .map(|(task, effective_level)| TaskView { task, effective_level })
        .collect();
    Ok(Json(tasks))
}
