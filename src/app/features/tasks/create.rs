use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, tasks::NewTask},
    domain::{TaskAccessLevel, TaskId, WorkStatus},
    error::AppError,
    session::ActingUser,
    AppState,
};

use super::{parse_assignee, parse_due_date, TaskView};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub assigned_user_id: Option<String>,
    pub status: Option<WorkStatus>,
    pub display_order: Option<i64>,
}

/// POST /api/tasks — Create a task in the creator's home organization and put
/// it first in the creator's personal order.
pub async fn create(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    let organization_id = user
        .home_organization_id
        .ok_or_else(|| AppError::Validation("Creator has no home organization".to_string()))?;
    let due_date = parse_due_date(request.due_date.as_deref())?;
    let assigned_user_id = parse_assignee(&state.db, request.assigned_user_id.as_deref()).await?;

    let id = TaskId::new();
    let mut tx = state.db.begin().await?;
    db::tasks::insert(
        &mut *tx,
        &NewTask {
            id,
            organization_id,
            created_by: user.id,
            title,
            description: request.description.unwrap_or_default(),
            due_date,
            status: request.status.unwrap_or_default(),
            assigned_user_id,
            display_order: request.display_order,
        },
    )
    .await?;
    db::task_orders::shift_down(&mut *tx, &user.id).await?;
    db::task_orders::insert(&mut *tx, &user.id, &id, 0).await?;
    let task = db::tasks::find_by_id(&mut *tx, &id)
        .await?
        .ok_or(AppError::Internal)?;
    tx.commit().await?;

    tracing::info!(task_id = %id, user_id = %user.id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(TaskView {
            task,
            effective_level: TaskAccessLevel::Owner,
        }),
    ))
}
