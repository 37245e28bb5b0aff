use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, tasks::TaskChanges},
    domain::{TaskAccessLevel, TaskId, UserId, WorkStatus},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

use super::{parse_assignee, parse_due_date, TaskView};

/// Partial update; `null` clears the nullable fields.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::app::features::present")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::app::features::present")]
    pub assigned_user_id: Option<Option<String>>,
    pub status: Option<WorkStatus>,
    #[serde(default, deserialize_with = "crate::app::features::present")]
    pub display_order: Option<Option<i64>>,
}

/// PATCH /api/tasks/:id — Requires `Full`.
pub async fn update(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskView>, AppError> {
    let (task, effective_level) = tenant::require_task(&state.db, &user, &id, TaskAccessLevel::Full).await?;
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    let title = match request.title.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Title is required".to_string())),
        Some(title) => title.to_string(),
        None => task.title.clone(),
    };
    let due_date = match request.due_date {
        Some(value) => parse_due_date(value.as_deref())?,
        None => parse_due_date(task.due_date.as_deref())?,
    };
    let assigned_user_id = match request.assigned_user_id {
        Some(value) => parse_assignee(&state.db, value.as_deref()).await?,
        None => task.assigned_user_id.as_deref().map(UserId::from_string).transpose()?,
    };
    let status = match request.status {
        Some(status) => status,
        None => task.status.parse()?,
    };

    let changes = TaskChanges {
        title,
        description: request.description.unwrap_or_else(|| task.description.clone()),
        due_date,
        status,
        assigned_user_id,
        display_order: request.display_order.unwrap_or(task.display_order),
    };

    let task_id = TaskId::from_string(&task.id)?;
    db::tasks::update(&state.db, &task_id, &changes).await?;
    let task = db::tasks::find_by_id(&state.db, &task_id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(TaskView { task, effective_level }))
}
