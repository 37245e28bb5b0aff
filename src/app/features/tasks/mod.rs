mod create;
mod delete;
mod grants;
mod order;
mod show;
mod update;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::app::{
    db::{self, Task},
    domain::{DueDate, TaskAccessLevel, UserId},
    error::AppError,
    AppState,
};

/// A task as returned to clients, with the level the viewer holds on it.
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub effective_level: TaskAccessLevel,
}

pub(crate) fn parse_due_date(value: Option<&str>) -> Result<Option<DueDate>, AppError> {
    value
        .map(DueDate::parse)
        .transpose()
        .map_err(|_| AppError::Validation("Dates must be formatted as YYYY-MM-DD".to_string()))
}

/// An assignee must be an existing user.
pub(crate) async fn parse_assignee(
    pool: &sqlx::SqlitePool,
    value: Option<&str>,
) -> Result<Option<UserId>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let invalid = || AppError::Validation("Assigned user not found".to_string());
    let id = UserId::from_string(value).map_err(|_| invalid())?;
    db::users::find_by_id(pool, &id).await?.ok_or_else(invalid)?;
    Ok(Some(id))
}

/// Task, grant and personal-order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", post(create::create).get(show::list))
        .route("/api/tasks/order", get(order::show).put(order::save))
        .route(
            "/api/tasks/:id",
            get(show::show).patch(update::update).delete(delete::delete),
        )
        .route("/api/tasks/:id/grants", axum::routing::put(grants::replace))
        .route("/api/tasks/:id/grants/users", get(grants::list_users))
        .route("/api/tasks/:id/grants/organizations", get(grants::list_organizations))
        .route("/api/tasks/:id/authorized-users", get(grants::authorized_users))
}
