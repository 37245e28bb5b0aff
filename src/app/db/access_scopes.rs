use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{OrgRole, OrganizationId, UserId};

/// Database row for access_scopes table. A NULL organization means
/// "the user's home organization".
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct AccessScope {
    pub id: String,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub role: String,
    pub created_at: i64,
}

const COLUMNS: &str = "id, user_id, organization_id, role, created_at";

/// All scopes held by a user.
pub async fn find_by_user<'e, E>(executor: E, user_id: &UserId) -> Result<Vec<AccessScope>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, AccessScope>(&format!(
        "SELECT {COLUMNS} FROM access_scopes WHERE user_id = ? ORDER BY created_at, id"
    ))
    .bind(user_id.as_str())
    .fetch_all(executor)
    .await
}

/// Find a scope by its own ID.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<AccessScope>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, AccessScope>(&format!("SELECT {COLUMNS} FROM access_scopes WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Data structure for inserting a new scope.
pub struct NewAccessScope {
    pub id: String,
    pub user_id: UserId,
    pub organization_id: Option<OrganizationId>,
    pub role: OrgRole,
}

/// Insert a new scope.
pub async fn insert<'e, E>(executor: E, scope: &NewAccessScope) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO access_scopes (id, user_id, organization_id, role, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&scope.id)
    .bind(scope.user_id.as_str())
    .bind(scope.organization_id.map(|o| o.as_str()))
    .bind(scope.role.to_string())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Change the role stored on an existing (user, organization) scope and
/// return its ID. `IS` matches the NULL home-organization row too.
pub async fn update_role<'e, E>(
    executor: E,
    user_id: &UserId,
    organization_id: Option<&OrganizationId>,
    role: OrgRole,
) -> Result<Option<String>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, String>(
        "UPDATE access_scopes SET role = ? WHERE user_id = ? AND organization_id IS ? RETURNING id",
    )
    .bind(role.to_string())
    .bind(user_id.as_str())
    .bind(organization_id.map(|o| o.as_str()))
    .fetch_optional(executor)
    .await
}

/// Delete a scope by ID. Returns whether a row was removed.
pub async fn delete<'e, E>(executor: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM access_scopes WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
