use sqlx::{FromRow, SqliteExecutor};

use crate::app::domain::{TaskId, UserId};

/// One entry of a user's personal task ordering.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct TaskOrderEntry {
    pub task_id: String,
    pub title: String,
    pub display_order: i64,
}

/// Push every slot of the user's ordering down by one, freeing slot 0.
pub async fn shift_down<'e, E>(executor: E, user_id: &UserId) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE user_task_orders SET display_order = display_order + 1 WHERE user_id = ?")
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Place a task at `display_order` in the user's ordering.
pub async fn insert<'e, E>(
    executor: E,
    user_id: &UserId,
    task_id: &TaskId,
    display_order: i64,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO user_task_orders (user_id, task_id, display_order) VALUES (?, ?, ?)
         ON CONFLICT (user_id, task_id) DO UPDATE SET display_order = excluded.display_order",
    )
    .bind(user_id.as_str())
    .bind(task_id.as_str())
    .bind(display_order)
    .execute(executor)
    .await?;
    Ok(())
}

/// Drop the user's entire ordering.
pub async fn clear_for_user<'e, E>(executor: E, user_id: &UserId) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM user_task_orders WHERE user_id = ?")
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// The user's ordering over live tasks, first slot first.
pub async fn list_for_user<'e, E>(executor: E, user_id: &UserId) -> Result<Vec<TaskOrderEntry>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TaskOrderEntry>(
        "SELECT o.task_id, t.title, o.display_order
         FROM user_task_orders o
         JOIN tasks t ON t.id = o.task_id
         WHERE o.user_id = ? AND t.deleted = 0
         ORDER BY o.display_order, t.created_at",
    )
    .bind(user_id.as_str())
    .fetch_all(executor)
    .await
}

/// Remove a task from every user's ordering.
pub async fn delete_for_task<'e, E>(executor: E, task_id: &TaskId) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM user_task_orders WHERE task_id = ?")
        .bind(task_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
