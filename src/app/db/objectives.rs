use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{DueDate, TaskId, UserId, WorkStatus};

/// Database row for objectives table.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Objective {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub due_date: Option<String>,
    pub assigned_user_id: Option<String>,
    pub status: String,
    pub display_order: i64,
    pub created_by: Option<String>,
    pub created_at: i64,
}

/// Data structure for inserting a new objective.
pub struct NewObjective {
    pub id: String,
    pub task_id: TaskId,
    pub title: String,
    pub due_date: Option<DueDate>,
    pub assigned_user_id: Option<UserId>,
    pub status: WorkStatus,
    pub created_by: UserId,
}

/// Editable objective fields.
pub struct ObjectiveChanges {
    pub title: String,
    pub due_date: Option<DueDate>,
    pub assigned_user_id: Option<UserId>,
    pub status: WorkStatus,
}

const COLUMNS: &str =
    "id, task_id, title, due_date, assigned_user_id, status, display_order, created_by, created_at";

/// Find a live objective by ID.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Objective>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Objective>(&format!(
        "SELECT {COLUMNS} FROM objectives WHERE id = ? AND deleted = 0"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Live objectives of a task in display order.
pub async fn list_for_task<'e, E>(executor: E, task_id: &TaskId) -> Result<Vec<Objective>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Objective>(&format!(
        "SELECT {COLUMNS} FROM objectives WHERE task_id = ? AND deleted = 0 ORDER BY display_order, created_at"
    ))
    .bind(task_id.as_str())
    .fetch_all(executor)
    .await
}

/// Insert an objective after the task's current last one.
pub async fn insert<'e, E>(executor: E, objective: &NewObjective) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO objectives (id, task_id, title, due_date, assigned_user_id, status, display_order, created_by, deleted, created_at)
         VALUES (?, ?, ?, ?, ?, ?,
                 (SELECT COALESCE(MAX(display_order) + 1, 0) FROM objectives WHERE task_id = ? AND deleted = 0),
                 ?, 0, ?)",
    )
    .bind(&objective.id)
    .bind(objective.task_id.as_str())
    .bind(&objective.title)
    .bind(objective.due_date.map(|d| d.as_string()))
    .bind(objective.assigned_user_id.map(|u| u.as_str()))
    .bind(objective.status.to_string())
    .bind(objective.task_id.as_str())
    .bind(objective.created_by.as_str())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Overwrite an objective's editable fields.
pub async fn update<'e, E>(executor: E, id: &str, changes: &ObjectiveChanges) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "UPDATE objectives SET title = ?, due_date = ?, assigned_user_id = ?, status = ? WHERE id = ?",
    )
    .bind(&changes.title)
    .bind(changes.due_date.map(|d| d.as_string()))
    .bind(changes.assigned_user_id.map(|u| u.as_str()))
    .bind(changes.status.to_string())
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Move an objective to a display slot.
pub async fn set_display_order<'e, E>(executor: E, id: &str, display_order: i64) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE objectives SET display_order = ? WHERE id = ?")
        .bind(display_order)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Soft-delete an objective.
pub async fn soft_delete<'e, E>(executor: E, id: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE objectives SET deleted = 1 WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
