use sqlx::{FromRow, SqliteExecutor};

use crate::app::domain::{OrganizationId, TaskAccessLevel, TaskId, UserId};

/// Database row for task_access_users table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskAccessUser {
    pub task_id: String,
    pub user_id: String,
    pub level: String,
}

/// Database row for task_access_organizations table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskAccessOrganization {
    pub task_id: String,
    pub organization_id: String,
    pub level: String,
}

/// A user grant joined with the grantee's profile.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct UserGrantDetail {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub level: String,
}

/// An organization grant joined with the organization's name.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct OrganizationGrantDetail {
    pub organization_id: String,
    pub name: String,
    pub level: String,
}

/// User grants on one task.
pub async fn users_for_task<'e, E>(executor: E, task_id: &TaskId) -> Result<Vec<TaskAccessUser>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TaskAccessUser>(
        "SELECT task_id, user_id, level FROM task_access_users WHERE task_id = ?",
    )
    .bind(task_id.as_str())
    .fetch_all(executor)
    .await
}

/// Organization grants on one task.
pub async fn organizations_for_task<'e, E>(
    executor: E,
    task_id: &TaskId,
) -> Result<Vec<TaskAccessOrganization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TaskAccessOrganization>(
        "SELECT task_id, organization_id, level FROM task_access_organizations WHERE task_id = ?",
    )
    .bind(task_id.as_str())
    .fetch_all(executor)
    .await
}

/// Every grant naming the user directly.
pub async fn for_user<'e, E>(executor: E, user_id: &UserId) -> Result<Vec<TaskAccessUser>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TaskAccessUser>(
        "SELECT task_id, user_id, level FROM task_access_users WHERE user_id = ?",
    )
    .bind(user_id.as_str())
    .fetch_all(executor)
    .await
}

/// Every grant naming the organization.
pub async fn for_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<TaskAccessOrganization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TaskAccessOrganization>(
        "SELECT task_id, organization_id, level FROM task_access_organizations WHERE organization_id = ?",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await
}

/// User grants on one task with the grantee's name and email.
pub async fn user_details_for_task<'e, E>(
    executor: E,
    task_id: &TaskId,
) -> Result<Vec<UserGrantDetail>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, UserGrantDetail>(
        "SELECT g.user_id, u.name, u.email, g.level
         FROM task_access_users g
         JOIN users u ON u.id = g.user_id
         WHERE g.task_id = ?
         ORDER BY u.name, u.id",
    )
    .bind(task_id.as_str())
    .fetch_all(executor)
    .await
}

/// Organization grants on one task with the organization's name.
pub async fn organization_details_for_task<'e, E>(
    executor: E,
    task_id: &TaskId,
) -> Result<Vec<OrganizationGrantDetail>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, OrganizationGrantDetail>(
        "SELECT g.organization_id, o.name, g.level
         FROM task_access_organizations g
         JOIN organizations o ON o.id = g.organization_id
         WHERE g.task_id = ?
         ORDER BY o.name, o.id",
    )
    .bind(task_id.as_str())
    .fetch_all(executor)
    .await
}

/// Create or change a user grant.
pub async fn upsert_user<'e, E>(
    executor: E,
    task_id: &TaskId,
    user_id: &UserId,
    level: TaskAccessLevel,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO task_access_users (id, task_id, user_id, level) VALUES (?, ?, ?, ?)
         ON CONFLICT (task_id, user_id) DO UPDATE SET level = excluded.level",
    )
    .bind(ulid::Ulid::new().to_string())
    .bind(task_id.as_str())
    .bind(user_id.as_str())
    .bind(level.to_string())
    .execute(executor)
    .await?;
    Ok(())
}

/// Remove a user grant.
pub async fn delete_user<'e, E>(executor: E, task_id: &TaskId, user_id: &UserId) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM task_access_users WHERE task_id = ? AND user_id = ?")
        .bind(task_id.as_str())
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Create or change an organization grant.
pub async fn upsert_organization<'e, E>(
    executor: E,
    task_id: &TaskId,
    organization_id: &OrganizationId,
    level: TaskAccessLevel,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO task_access_organizations (id, task_id, organization_id, level) VALUES (?, ?, ?, ?)
         ON CONFLICT (task_id, organization_id) DO UPDATE SET level = excluded.level",
    )
    .bind(ulid::Ulid::new().to_string())
    .bind(task_id.as_str())
    .bind(organization_id.as_str())
    .bind(level.to_string())
    .execute(executor)
    .await?;
    Ok(())
}

/// Remove an organization grant.
pub async fn delete_organization<'e, E>(
    executor: E,
    task_id: &TaskId,
    organization_id: &OrganizationId,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM task_access_organizations WHERE task_id = ? AND organization_id = ?")
        .bind(task_id.as_str())
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Drop every user grant on a task.
pub async fn delete_users_for_task<'e, E>(executor: E, task_id: &TaskId) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM task_access_users WHERE task_id = ?")
        .bind(task_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Drop every organization grant on a task.
pub async fn delete_organizations_for_task<'e, E>(executor: E, task_id: &TaskId) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM task_access_organizations WHERE task_id = ?")
        .bind(task_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
