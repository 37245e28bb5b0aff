use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{
        self,
        progress_updates::{NewProgressUpdate, ProgressUpdate},
    },
    domain::{DueDate, TaskAccessLevel, WorkStatus},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

use super::objectives::require_objective;

#[derive(Debug, Deserialize, Validate)]
pub struct AddProgressRequest {
    pub status: WorkStatus,
    #[validate(length(min = 1, max = 10000))]
    pub detail: String,
    /// Defaults to today.
    pub report_date: Option<String>,
}

/// POST /api/objectives/:id/progress — Requires `Edit` on the task, or being
/// the objective's assignee.
pub async fn add(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(objective_id): Path<String>,
    Json(request): Json<AddProgressRequest>,
) -> Result<(StatusCode, Json<ProgressUpdate>), AppError> {
    let objective = db::objectives::find_by_id(&state.db, &objective_id)
        .await?
        .ok_or_else(|| AppError::not_found("Objective"))?;
    let actor = user.id.as_str();
    let is_assignee = objective.assigned_user_id.as_deref() == Some(actor.as_str());
    match tenant::require_task(&state.db, &user, &objective.task_id, TaskAccessLevel::Edit).await {
        Ok(_) => {}
        Err(AppError::PermissionDenied(_)) if is_assignee => {}
        Err(err) => return Err(err),
    }

    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;
    let report_date = match request.report_date.as_deref() {
        Some(value) => DueDate::parse(value)
            .map_err(|_| AppError::Validation("Dates must be formatted as YYYY-MM-DD".to_string()))?,
        None => DueDate::today(),
    };

    let id = ulid::Ulid::new().to_string();
    db::progress_updates::insert(
        &state.db,
        &NewProgressUpdate {
            id: id.clone(),
            objective_id: objective.id.clone(),
            status: request.status,
            detail: request.detail,
            report_date,
            updated_by: user.id,
        },
    )
    .await?;

    let update = db::progress_updates::find_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::Internal)?;
    tracing::info!(objective_id = %objective.id, progress_id = %id, "progress recorded");
    Ok((StatusCode::CREATED, Json(update)))
}

/// GET /api/objectives/:id/progress — Newest first.
pub async fn list(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(objective_id): Path<String>,
) -> Result<Json<Vec<ProgressUpdate>>, AppError> {
    let (objective, _) = require_objective(&state.db, &user, &objective_id, TaskAccessLevel::View).await?;
    Ok(Json(db::progress_updates::list_for_objective(&state.db, &objective.id).await?))
}

/// GET /api/objectives/:id/progress/latest — `null` when nothing was reported yet.
pub async fn latest(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(objective_id): Path<String>,
) -> Result<Json<Option<ProgressUpdate>>, AppError> {
    let (objective, _) = require_objective(&state.db, &user, &objective_id, TaskAccessLevel::View).await?;
    Ok(Json(db::progress_updates::latest_for_objective(&state.db, &objective.id).await?))
}

/// DELETE /api/progress/:id — Requires `Full` on the task.
pub async fn remove(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let update = db::progress_updates::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Progress note"))?;
    require_objective(&state.db, &user, &update.objective_id, TaskAccessLevel::Full).await?;
    db::progress_updates::soft_delete(&state.db, &update.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/objectives/:id/progress", get(list).post(add))
        .route("/api/objectives/:id/progress/latest", get(latest))
        .route("/api/progress/:id", delete(remove))
}
