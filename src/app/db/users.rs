use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{Email, OrganizationId, UserId};

/// Database row for users table.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub organization_id: Option<String>,
    pub is_superuser: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new user.
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub organization_id: Option<OrganizationId>,
    pub is_superuser: bool,
}

const COLUMNS: &str = "id, name, email, organization_id, is_superuser, created_at, updated_at";

/// Find a user by ID.
pub async fn find_by_id<'e, E>(executor: E, user_id: &UserId) -> Result<Option<User>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id.as_str())
        .fetch_optional(executor)
        .await
}

/// Find a user by email address.
pub async fn find_by_email<'e, E>(executor: E, email: &Email) -> Result<Option<User>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
        .bind(email.as_str())
        .fetch_optional(executor)
        .await
}

/// Users whose home organization is one of `organization_ids` and still live,
/// sorted by name.
pub async fn list_by_organizations<'e, E>(
    executor: E,
    organization_ids: &[OrganizationId],
) -> Result<Vec<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    if organization_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!(
        "SELECT {COLUMNS} FROM users WHERE organization_id IN (SELECT id FROM organizations WHERE deleted = 0 AND id IN ("
    ));
    let mut ids = query.separated(", ");
    for id in organization_ids {
        ids.push_bind(id.as_str());
    }
    ids.push_unseparated(")) ORDER BY name, id");
    query.build_query_as::<User>().fetch_all(executor).await
}

/// Users with the given IDs, sorted by name.
pub async fn list_by_ids<'e, E>(executor: E, user_ids: &[UserId]) -> Result<Vec<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM users WHERE id IN ("));
    let mut ids = query.separated(", ");
    for id in user_ids {
        ids.push_bind(id.as_str());
    }
    ids.push_unseparated(")) ORDER BY name, id");
    query.build_query_as::<User>().fetch_all(executor).await
}

/// Insert a new user.
pub async fn insert<'e, E>(executor: E, user: &NewUser) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO users (id, name, email, organization_id, is_superuser, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id.as_str())
    .bind(&user.name)
    .bind(user.email.as_str())
    .bind(user.organization_id.map(|o| o.as_str()))
    .bind(user.is_superuser)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}
