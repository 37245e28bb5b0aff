use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::app::{
    access::Principal,
    db::{
        self,
        objectives::{NewObjective, Objective, ObjectiveChanges},
    },
    domain::{TaskAccessLevel, TaskId, UserId, WorkStatus},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

use super::tasks::{parse_assignee, parse_due_date};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateObjectiveRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub due_date: Option<String>,
    pub assigned_user_id: Option<String>,
    pub status: Option<WorkStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateObjectiveRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::app::features::present")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::app::features::present")]
    pub assigned_user_id: Option<Option<String>>,
    pub status: Option<WorkStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub objective_ids: Vec<String>,
}

/// Load a live objective and check the user holds `required` on its task.
pub(crate) async fn require_objective(
    pool: &SqlitePool,
    user: &Principal,
    objective_id: &str,
    required: TaskAccessLevel,
) -> Result<(Objective, db::Task), AppError> {
    let objective = db::objectives::find_by_id(pool, objective_id)
        .await?
        .ok_or_else(|| AppError::not_found("Objective"))?;
    let (task, _) = tenant::require_task(pool, user, &objective.task_id, required).await?;
    Ok((objective, task))
}

/// Close the gaps left by a removed objective.
async fn renumber(conn: &mut sqlx::SqliteConnection, task_id: &TaskId) -> Result<(), AppError> {
    let remaining = db::objectives::list_for_task(&mut *conn, task_id).await?;
    for (position, objective) in remaining.iter().enumerate() {
        let position = position as i64;
        if objective.display_order != position {
            db::objectives::set_display_order(&mut *conn, &objective.id, position).await?;
        }
    }
    Ok(())
}

/// GET /api/tasks/:id/objectives
pub async fn list(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<Objective>>, AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &task_id, TaskAccessLevel::View).await?;
    let task_id = TaskId::from_string(&task.id)?;
    Ok(Json(db::objectives::list_for_task(&state.db, &task_id).await?))
}

/// POST /api/tasks/:id/objectives — Append an objective. Requires `Edit`.
pub async fn create(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<CreateObjectiveRequest>,
) -> Result<(StatusCode, Json<Objective>), AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &task_id, TaskAccessLevel::Edit).await?;
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let id = ulid::Ulid::new().to_string();
    db::objectives::insert(
        &state.db,
        &NewObjective {
            id: id.clone(),
            task_id: TaskId::from_string(&task.id)?,
            title,
            due_date: parse_due_date(request.due_date.as_deref())?,
            assigned_user_id: parse_assignee(&state.db, request.assigned_user_id.as_deref()).await?,
            status: request.status.unwrap_or_default(),
            created_by: user.id,
        },
    )
    .await?;

    let objective = db::objectives::find_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(objective)))
}

/// GET /api/objectives/:id
pub async fn show(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Objective>, AppError> {
    let (objective, _) = require_objective(&state.db, &user, &id, TaskAccessLevel::View).await?;
    Ok(Json(objective))
}

/// PATCH /api/objectives/:id — Requires `Edit` on the task.
pub async fn update(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateObjectiveRequest>,
) -> Result<Json<Objective>, AppError> {
    let (objective, _) = require_objective(&state.db, &user, &id, TaskAccessLevel::Edit).await?;
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    let title = match request.title.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Title is required".to_string())),
        Some(title) => title.to_string(),
        None => objective.title.clone(),
    };
    let changes = ObjectiveChanges {
        title,
        due_date: match request.due_date {
            Some(value) => parse_due_date(value.as_deref())?,
            None => parse_due_date(objective.due_date.as_deref())?,
        },
        assigned_user_id: match request.assigned_user_id {
            Some(value) => parse_assignee(&state.db, value.as_deref()).await?,
            None => objective
                .assigned_user_id
                .as_deref()
                .map(UserId::from_string)
                .transpose()?,
        },
        status: match request.status {
            Some(status) => status,
            None => objective.status.parse()?,
        },
    };

    db::objectives::update(&state.db, &objective.id, &changes).await?;
    let objective = db::objectives::find_by_id(&state.db, &objective.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(objective))
}

/// DELETE /api/objectives/:id — Soft-delete and renumber the rest. Requires `Edit`.
pub async fn delete(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let (objective, task) = require_objective(&state.db, &user, &id, TaskAccessLevel::Edit).await?;
    let task_id = TaskId::from_string(&task.id)?;

    let mut tx = state.db.begin().await?;
    db::objectives::soft_delete(&mut *tx, &objective.id).await?;
    renumber(&mut tx, &task_id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/tasks/:id/objectives/order — Listed objectives take the first
/// slots in the given order; any left out keep their relative order after them.
pub async fn reorder(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<Objective>>, AppError> {
    let (task, _) = tenant::require_task(&state.db, &user, &task_id, TaskAccessLevel::Edit).await?;
    let task_id = TaskId::from_string(&task.id)?;

    let mut tx = state.db.begin().await?;
    let current = db::objectives::list_for_task(&mut *tx, &task_id).await?;
    let known: HashSet<&str> = current.iter().map(|o| o.id.as_str()).collect();

    let mut placed = HashSet::new();
    let mut order: Vec<&str> = Vec::with_capacity(current.len());
    for id in &request.objective_ids {
        if !known.contains(id.as_str()) {
            return Err(AppError::not_found("Objective"));
        }
        if placed.insert(id.as_str()) {
            order.push(id.as_str());
        }
    }
    order.extend(current.iter().map(|o| o.id.as_str()).filter(|id| !placed.contains(id)));

    for (position, id) in order.iter().enumerate() {
        db::objectives::set_display_order(&mut *tx, id, position as i64).await?;
    }
    let objectives = db::objectives::list_for_task(&mut *tx, &task_id).await?;
    tx.commit().await?;
    Ok(Json(objectives))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks/:id/objectives", get(list).post(create))
        .route("/api/tasks/:id/objectives/order", put(reorder))
        .route(
            "/api/objectives/:id",
            get(show).patch(update).delete(delete),
        )
}
