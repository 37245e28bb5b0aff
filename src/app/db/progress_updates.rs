use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{DueDate, UserId, WorkStatus};

/// Database row for progress_updates table.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct ProgressUpdate {
    pub id: String,
    pub objective_id: String,
    pub status: String,
    pub detail: String,
    pub report_date: String,
    pub updated_by: Option<String>,
    pub created_at: i64,
}

/// Data structure for inserting a new progress note.
pub struct NewProgressUpdate {
    pub id: String,
    pub objective_id: String,
    pub status: WorkStatus,
    pub detail: String,
    pub report_date: DueDate,
    pub updated_by: UserId,
}

const COLUMNS: &str = "id, objective_id, status, detail, report_date, updated_by, created_at";

/// Find a live progress note by ID.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<ProgressUpdate>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ProgressUpdate>(&format!(
        "SELECT {COLUMNS} FROM progress_updates WHERE id = ? AND deleted = 0"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Live notes of an objective, newest report first.
pub async fn list_for_objective<'e, E>(
    executor: E,
    objective_id: &str,
) -> Result<Vec<ProgressUpdate>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ProgressUpdate>(&format!(
        "SELECT {COLUMNS} FROM progress_updates WHERE objective_id = ? AND deleted = 0
         ORDER BY report_date DESC, created_at DESC, id DESC"
    ))
    .bind(objective_id)
    .fetch_all(executor)
    .await
}

/// Most recent live note of an objective.
pub async fn latest_for_objective<'e, E>(
    executor: E,
    objective_id: &str,
) -> Result<Option<ProgressUpdate>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ProgressUpdate>(&format!(
        "SELECT {COLUMNS} FROM progress_updates WHERE objective_id = ? AND deleted = 0
         ORDER BY report_date DESC, created_at DESC, id DESC LIMIT 1"
    ))
    .bind(objective_id)
    .fetch_optional(executor)
    .await
}

/// Insert a progress note.
pub async fn insert<'e, E>(executor: E, update: &NewProgressUpdate) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO progress_updates (id, objective_id, status, detail, report_date, updated_by, deleted, created_at)
         VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(&update.id)
    .bind(&update.objective_id)
    .bind(update.status.to_string())
    .bind(&update.detail)
    .bind(update.report_date.as_string())
    .bind(update.updated_by.as_str())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Soft-delete a progress note.
pub async fn soft_delete<'e, E>(executor: E, id: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE progress_updates SET deleted = 1 WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
