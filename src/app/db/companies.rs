use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::CompanyId;

/// Database row for companies table.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub deleted: bool,
    pub created_at: i64,
}

/// Data structure for inserting a new company.
pub struct NewCompany {
    pub id: CompanyId,
    pub name: String,
}

/// Insert a new company.
pub async fn insert<'e, E>(executor: E, company: &NewCompany) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("INSERT INTO companies (id, name, deleted, created_at) VALUES (?, ?, 0, ?)")
        .bind(company.id.as_str())
        .bind(&company.name)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

/// Find a live (not soft-deleted) company by ID.
pub async fn find_by_id<'e, E>(executor: E, id: &CompanyId) -> Result<Option<Company>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Company>(
        "SELECT id, name, deleted, created_at FROM companies WHERE id = ? AND deleted = 0",
    )
    .bind(id.as_str())
    .fetch_optional(executor)
    .await
}

/// Find a company by ID, including soft-deleted ones.
pub async fn find_by_id_with_deleted<'e, E>(
    executor: E,
    id: &CompanyId,
) -> Result<Option<Company>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Company>("SELECT id, name, deleted, created_at FROM companies WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(executor)
        .await
}

/// All live companies, oldest first.
pub async fn list<'e, E>(executor: E) -> Result<Vec<Company>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Company>(
        "SELECT id, name, deleted, created_at FROM companies WHERE deleted = 0 ORDER BY created_at, id",
    )
    .fetch_all(executor)
    .await
}

/// Whether a live company other than `except` already uses `name`.
pub async fn name_in_use<'e, E>(
    executor: E,
    name: &str,
    except: Option<&CompanyId>,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM companies WHERE name = ? AND deleted = 0 AND id IS NOT ?",
    )
    .bind(name)
    .bind(except.map(|id| id.as_str()))
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Rename a company.
pub async fn rename<'e, E>(executor: E, id: &CompanyId, name: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE companies SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Set or clear the soft-delete flag.
pub async fn set_deleted<'e, E>(executor: E, id: &CompanyId, deleted: bool) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE companies SET deleted = ? WHERE id = ?")
        .bind(deleted)
        .bind(id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
