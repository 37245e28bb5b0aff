use std::collections::HashSet;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::app::{
    db::{self, task_orders::TaskOrderEntry},
    domain::TaskId,
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

#[derive(Debug, Deserialize)]
pub struct SaveOrderRequest {
    pub task_ids: Vec<String>,
}

/// GET /api/tasks/order — The acting user's personal order over live tasks.
pub async fn show(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskOrderEntry>>, AppError> {
    Ok(Json(db::task_orders::list_for_user(&state.db, &user.id).await?))
}

/// PUT /api/tasks/order — Replace the personal order. Every listed task must
/// be visible to the user; duplicates keep their first position.
pub async fn save(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Json(request): Json<SaveOrderRequest>,
) -> Result<Json<Vec<TaskOrderEntry>>, AppError> {
    let visible: HashSet<String> = tenant::list_visible_tasks(&state.db, &user)
        .await?
        .into_iter()
        .map(|(task, _)| task.id)
        .collect();

    let mut seen = HashSet::new();
    let mut ordered = Vec::with_capacity(request.task_ids.len());
    for raw in &request.task_ids {
        if !visible.contains(raw) {
            return Err(AppError::not_found("Task"));
        }
        if seen.insert(raw.as_str()) {
            ordered.push(TaskId::from_string(raw)?);
        }
    }

    let mut tx = state.db.begin().await?;
    db::task_orders::clear_for_user(&mut *tx, &user.id).await?;
    for (position, task_id) in ordered.iter().enumerate() {
        db::task_orders::insert(&mut *tx, &user.id, task_id, position as i64).await?;
    }
    let entries = db::task_orders::list_for_user(&mut *tx, &user.id).await?;
    tx.commit().await?;
    Ok(Json(entries))
}
