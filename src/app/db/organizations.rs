use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{CompanyId, OrganizationId};

/// Database row for organizations table.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub code: String,
    pub company_id: String,
    pub parent_id: Option<String>,
    pub level: i64,
    pub deleted: bool,
    pub created_at: i64,
}

/// Data structure for inserting a new organization.
pub struct NewOrganization {
    pub id: OrganizationId,
    pub name: String,
    pub code: String,
    pub company_id: CompanyId,
    pub parent_id: Option<OrganizationId>,
    pub level: i64,
}

const COLUMNS: &str = "id, name, code, company_id, parent_id, level, deleted, created_at";

/// Find a live organization by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations WHERE id = ? AND deleted = 0"
    ))
    .bind(organization_id.as_str())
    .fetch_optional(executor)
    .await
}

/// Every live organization, parents before children.
pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations WHERE deleted = 0 ORDER BY level, created_at, id"
    ))
    .fetch_all(executor)
    .await
}

/// Live organizations of one company, parents before children.
pub async fn list_by_company<'e, E>(
    executor: E,
    company_id: &CompanyId,
) -> Result<Vec<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations WHERE company_id = ? AND deleted = 0 ORDER BY level, created_at, id"
    ))
    .bind(company_id.as_str())
    .fetch_all(executor)
    .await
}

/// Live direct children of an organization.
pub async fn list_children<'e, E>(
    executor: E,
    parent_id: &OrganizationId,
) -> Result<Vec<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations WHERE parent_id = ? AND deleted = 0 ORDER BY created_at, id"
    ))
    .bind(parent_id.as_str())
    .fetch_all(executor)
    .await
}

/// Whether the company already has a live root organization.
pub async fn has_root<'e, E>(executor: E, company_id: &CompanyId) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM organizations WHERE company_id = ? AND parent_id IS NULL AND deleted = 0",
    )
    .bind(company_id.as_str())
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Whether a live organization of the company already uses `code`.
pub async fn code_in_use<'e, E>(
    executor: E,
    company_id: &CompanyId,
    code: &str,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM organizations WHERE company_id = ? AND code = ? AND deleted = 0",
    )
    .bind(company_id.as_str())
    .bind(code)
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Whether any live organization points at `organization_id` as its parent.
pub async fn has_children<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM organizations WHERE parent_id = ? AND deleted = 0",
    )
    .bind(organization_id.as_str())
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Insert a new organization.
pub async fn insert<'e, E>(executor: E, organization: &NewOrganization) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organizations (id, name, code, company_id, parent_id, level, deleted, created_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(organization.id.as_str())
    .bind(&organization.name)
    .bind(&organization.code)
    .bind(organization.company_id.as_str())
    .bind(organization.parent_id.map(|p| p.as_str()))
    .bind(organization.level)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Rename an organization.
pub async fn update_name<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    name: &str,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE organizations SET name = ? WHERE id = ?")
        .bind(name)
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Point an organization at a new parent (or none).
pub async fn update_parent<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    parent_id: Option<&OrganizationId>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE organizations SET parent_id = ? WHERE id = ?")
        .bind(parent_id.map(|p| p.as_str()))
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Store a recomputed level.
pub async fn update_level<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    level: i64,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE organizations SET level = ? WHERE id = ?")
        .bind(level)
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Soft-delete one organization.
pub async fn soft_delete<'e, E>(executor: E, organization_id: &OrganizationId) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE organizations SET deleted = 1 WHERE id = ?")
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Soft-delete every live organization of a company, marking the rows so a
/// restore brings back only these and not organizations deleted earlier.
pub async fn delete_with_company<'e, E>(executor: E, company_id: &CompanyId) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE organizations SET deleted = 1, deleted_with_company = 1 WHERE company_id = ? AND deleted = 0",
    )
    .bind(company_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Undo `delete_with_company`.
pub async fn restore_with_company<'e, E>(executor: E, company_id: &CompanyId) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE organizations SET deleted = 0, deleted_with_company = 0 WHERE company_id = ? AND deleted_with_company = 1",
    )
    .bind(company_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
