use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{DueDate, OrganizationId, TaskId, UserId, WorkStatus};

/// Database row for tasks table.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Task {
    pub id: String,
    pub organization_id: Option<String>,
    pub created_by: Option<String>,
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub status: String,
    pub assigned_user_id: Option<String>,
    pub display_order: Option<i64>,
    pub deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A task together with the viewer's personal ordering slot.
#[derive(Debug, Clone, FromRow)]
pub struct OrderedTask {
    #[sqlx(flatten)]
    pub task: Task,
    pub user_order: Option<i64>,
}

/// Data structure for inserting a new task.
pub struct NewTask {
    pub id: TaskId,
    pub organization_id: OrganizationId,
    pub created_by: UserId,
    pub title: String,
    pub description: String,
    pub due_date: Option<DueDate>,
    pub status: WorkStatus,
    pub assigned_user_id: Option<UserId>,
    pub display_order: Option<i64>,
}

/// Editable task fields, written as a whole.
pub struct TaskChanges {
    pub title: String,
    pub description: String,
    pub due_date: Option<DueDate>,
    pub status: WorkStatus,
    pub assigned_user_id: Option<UserId>,
    pub display_order: Option<i64>,
}

const COLUMNS: &str = "t.id, t.organization_id, t.created_by, t.title, t.description, t.due_date, t.status, t.assigned_user_id, t.display_order, t.deleted, t.created_at, t.updated_at";

/// Find a task by ID, soft-deleted ones included so callers can tell
/// "deleted" from "missing".
pub async fn find_by_id<'e, E>(executor: E, task_id: &TaskId) -> Result<Option<Task>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks t WHERE t.id = ?"))
        .bind(task_id.as_str())
        .fetch_optional(executor)
        .await
}

/// Live tasks the user could possibly see: created by them, granted to them,
/// or granted to their home organization. Superusers get every live task.
/// Sorted by the user's personal order, then the task's shared order.
pub async fn list_candidates<'e, E>(
    executor: E,
    user_id: &UserId,
    home_organization_id: Option<&OrganizationId>,
    is_superuser: bool,
) -> Result<Vec<OrderedTask>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, OrderedTask>(&format!(
        "SELECT {COLUMNS}, o.display_order AS user_order
         FROM tasks t
         LEFT JOIN user_task_orders o ON o.task_id = t.id AND o.user_id = ?
         WHERE t.deleted = 0 AND (
             ? = 1
             OR t.created_by = ?
             OR t.id IN (SELECT task_id FROM task_access_users WHERE user_id = ?)
             OR t.id IN (SELECT task_id FROM task_access_organizations WHERE organization_id = ?)
         )
         ORDER BY o.display_order IS NULL, o.display_order,
                  t.display_order IS NULL, t.display_order,
                  t.created_at, t.id"
    ))
    .bind(user_id.as_str())
    .bind(is_superuser)
    .bind(user_id.as_str())
    .bind(user_id.as_str())
    .bind(home_organization_id.map(|o| o.as_str()))
    .fetch_all(executor)
    .await
}

/// Insert a new task.
pub async fn insert<'e, E>(executor: E, task: &NewTask) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO tasks (id, organization_id, created_by, title, description, due_date, status, assigned_user_id, display_order, deleted, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(task.id.as_str())
    .bind(task.organization_id.as_str())
    .bind(task.created_by.as_str())
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.due_date.map(|d| d.as_string()))
    .bind(task.status.to_string())
    .bind(task.assigned_user_id.map(|u| u.as_str()))
    .bind(task.display_order)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Overwrite a task's editable fields.
pub async fn update<'e, E>(executor: E, task_id: &TaskId, changes: &TaskChanges) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, due_date = ?, status = ?, assigned_user_id = ?, display_order = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.due_date.map(|d| d.as_string()))
    .bind(changes.status.to_string())
    .bind(changes.assigned_user_id.map(|u| u.as_str()))
    .bind(changes.display_order)
    .bind(now)
    .bind(task_id.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

/// Soft-delete a task.
pub async fn soft_delete<'e, E>(executor: E, task_id: &TaskId) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE tasks SET deleted = 1, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(task_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
