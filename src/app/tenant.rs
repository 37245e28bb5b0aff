//! Tenant isolation enforcement.
//!
//! Loads the access engine's inputs from the store and answers the two
//! questions every feature asks: may this user act on that target, and which
//! targets may this user see. Existence is checked before permission, so a
//! missing or soft-deleted target is always `NotFound`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::app::access::{
    can_access_task, effective_task_level, visible_organizations, visible_tasks, AccessResolver, OrgGrant, OrgNode,
    OrgTree, Principal, Scope, ScopeStore, TaskGrantStore, TaskRef, UserGrant, VisibleTask,
};
use crate::app::db;
use crate::app::domain::{
    CompanyId, OrgRole, OrganizationId, TaskAccessLevel, TaskId, UserId,
};
use crate::app::error::AppError;

pub fn principal_from_row(user: &db::User) -> Result<Principal, AppError> {
    Ok(Principal {
        id: UserId::from_string(&user.id)?,
        home_organization_id: user
            .organization_id
            .as_deref()
            .map(OrganizationId::from_string)
            .transpose()?,
        is_superuser: user.is_superuser,
    })
}

/// Resolve a raw user ID to a principal. `None` if the ID is malformed or unknown.
pub async fn load_principal(pool: &SqlitePool, user_id: &str) -> Result<Option<Principal>, AppError> {
    let Ok(user_id) = UserId::from_string(user_id) else {
        return Ok(None);
    };
    db::users::find_by_id(pool, &user_id)
        .await?
        .as_ref()
        .map(principal_from_row)
        .transpose()
}

fn node_from_row(org: &db::Organization) -> Result<OrgNode, AppError> {
    Ok(OrgNode {
        id: OrganizationId::from_string(&org.id)?,
        company_id: CompanyId::from_string(&org.company_id)?,
        parent_id: org
            .parent_id
            .as_deref()
            .map(OrganizationId::from_string)
            .transpose()?,
        level: org.level,
    })
}

pub fn tree_from_rows(rows: &[db::Organization]) -> Result<OrgTree, AppError> {
    let nodes = rows.iter().map(node_from_row).collect::<Result<Vec<_>, _>>()?;
    Ok(OrgTree::build(nodes))
}

/// Live organizations of one company, or of every company.
pub async fn load_tree(pool: &SqlitePool, company_id: Option<&CompanyId>) -> Result<OrgTree, AppError> {
    let rows = match company_id {
        Some(company_id) => db::organizations::list_by_company(pool, company_id).await?,
        None => db::organizations::list_all(pool).await?,
    };
    tree_from_rows(&rows)
}

pub async fn load_scopes(pool: &SqlitePool, user_id: &UserId) -> Result<ScopeStore, AppError> {
    let rows = db::access_scopes::find_by_user(pool, user_id).await?;
    let mut scopes = Vec::with_capacity(rows.len());
    for row in rows {
        scopes.push(Scope {
            user_id: UserId::from_string(&row.user_id)?,
            organization_id: row
                .organization_id
                .as_deref()
                .map(OrganizationId::from_string)
                .transpose()?,
            role: row.role.parse::<OrgRole>()?,
        });
    }
    Ok(ScopeStore::new(scopes))
}

pub fn user_grant_from_row(row: &db::task_access::TaskAccessUser) -> Result<UserGrant, AppError> {
    Ok(UserGrant {
        task_id: TaskId::from_string(&row.task_id)?,
        user_id: UserId::from_string(&row.user_id)?,
        level: row.level.parse()?,
    })
}

pub fn org_grant_from_row(row: &db::task_access::TaskAccessOrganization) -> Result<OrgGrant, AppError> {
    Ok(OrgGrant {
        task_id: TaskId::from_string(&row.task_id)?,
        organization_id: OrganizationId::from_string(&row.organization_id)?,
        level: row.level.parse()?,
    })
}

/// Every grant row on one task.
pub async fn load_task_grants(pool: &SqlitePool, task_id: &TaskId) -> Result<TaskGrantStore, AppError> {
    let users = db::task_access::users_for_task(pool, task_id).await?;
    let orgs = db::task_access::organizations_for_task(pool, task_id).await?;
    Ok(TaskGrantStore::new(
        users.iter().map(user_grant_from_row).collect::<Result<Vec<_>, _>>()?,
        orgs.iter().map(org_grant_from_row).collect::<Result<Vec<_>, _>>()?,
    ))
}

pub fn task_ref_from_row(task: &db::Task) -> Result<TaskRef, AppError> {
    Ok(TaskRef {
        id: TaskId::from_string(&task.id)?,
        created_by: task.created_by.as_deref().map(UserId::from_string).transpose()?,
        deleted: task.deleted,
    })
}

/// Load a live organization and check `user` holds at least `required` over it.
pub async fn require_organization(
    pool: &SqlitePool,
    user: &Principal,
    organization_id: &str,
    required: OrgRole,
) -> Result<db::Organization, AppError> {
    let id = OrganizationId::from_string(organization_id)
        .map_err(|_| AppError::not_found("Organization"))?;
    let organization = db::organizations::find_by_id(pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization"))?;

    if !user.is_superuser {
        let company_id = CompanyId::from_string(&organization.company_id)?;
        let tree = load_tree(pool, Some(&company_id)).await?;
        let scopes = load_scopes(pool, &user.id).await?;
        if !AccessResolver::new(&tree, &scopes).can_access_organization(user, &id, required) {
            return Err(AppError::denied());
        }
    }
    Ok(organization)
}

/// `user` as task checks see it: a soft-deleted home organization passes on
/// no task grants, so it is dropped.
async fn with_live_home(pool: &SqlitePool, user: &Principal) -> Result<Principal, AppError> {
    let mut user = user.clone();
    if let Some(home) = user.home_organization_id {
        if db::organizations::find_by_id(pool, &home).await?.is_none() {
            tracing::debug!(user_id = %user.id, organization_id = %home, "home organization deleted; ignoring its task grants");
            user.home_organization_id = None;
        }
    }
    Ok(user)
}

/// Load a live task and check `user` holds at least `required` on it.
/// Returns the task with the strongest level the user holds.
pub async fn require_task(
    pool: &SqlitePool,
    user: &Principal,
    task_id: &str,
    required: TaskAccessLevel,
) -> Result<(db::Task, TaskAccessLevel), AppError> {
    let id = TaskId::from_string(task_id).map_err(|_| AppError::not_found("Task"))?;
    let task = db::tasks::find_by_id(pool, &id)
        .await?
        .filter(|task| !task.deleted)
        .ok_or_else(|| AppError::not_found("Task"))?;

    let user = &with_live_home(pool, user).await?;
    let grants = load_task_grants(pool, &id).await?;
    let task_ref = task_ref_from_row(&task)?;
    if !can_access_task(user, &task_ref, &grants, required) {
        return Err(AppError::denied());
    }
    let level = effective_task_level(user, &task_ref, &grants).ok_or(AppError::Internal)?;
    Ok((task, level))
}

/// Live organizations `user` may see, parents before children.
pub async fn list_visible_organizations(
    pool: &SqlitePool,
    user: &Principal,
    company_id: Option<&CompanyId>,
) -> Result<Vec<db::Organization>, AppError> {
    let rows = match company_id {
        Some(company_id) => db::organizations::list_by_company(pool, company_id).await?,
        None => db::organizations::list_all(pool).await?,
    };
    let tree = tree_from_rows(&rows)?;
    let scopes = load_scopes(pool, &user.id).await?;
    let visible = visible_organizations(user, &tree, &scopes);
    Ok(rows
        .into_iter()
        .filter(|row| {
            OrganizationId::from_string(&row.id).is_ok_and(|id| visible.contains(&id))
        })
        .collect())
}

/// Live tasks `user` may see, in their personal order, each with the level held.
pub async fn list_visible_tasks(
    pool: &SqlitePool,
    user: &Principal,
) -> Result<Vec<(db::Task, TaskAccessLevel)>, AppError> {
    let user = &with_live_home(pool, user).await?;
    let candidates = db::tasks::list_candidates(
        pool,
        &user.id,
        user.home_organization_id.as_ref(),
        user.is_superuser,
    )
    .await?;

    let user_rows = db::task_access::for_user(pool, &user.id).await?;
    let org_rows = match &user.home_organization_id {
        Some(home) => db::task_access::for_organization(pool, home).await?,
        None => Vec::new(),
    };
    let grants = TaskGrantStore::new(
        user_rows.iter().map(user_grant_from_row).collect::<Result<Vec<_>, _>>()?,
        org_rows.iter().map(org_grant_from_row).collect::<Result<Vec<_>, _>>()?,
    );

    let refs = candidates
        .iter()
        .map(|row| task_ref_from_row(&row.task))
        .collect::<Result<Vec<_>, _>>()?;
    let levels = visible_tasks(user, &refs, &grants);

    let mut by_id: HashMap<TaskId, TaskAccessLevel> = levels
        .into_iter()
        .map(|VisibleTask { task_id, effective_level }| (task_id, effective_level))
        .collect();
    let mut tasks = Vec::with_capacity(by_id.len());
    for (row, task_ref) in candidates.into_iter().zip(refs) {
        if let Some(level) = by_id.remove(&task_ref.id) {
            tasks.push((row.task, level));
        }
    }
    Ok(tasks)
}

/// What `POST /api/authorize` is asked about.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessRequest {
    Organization { id: String, required: OrgRole },
    Task { id: String, required: TaskAccessLevel },
}

/// Allow/deny for one target. Unknown or soft-deleted targets are denied.
pub async fn authorize(pool: &SqlitePool, user: &Principal, request: &AccessRequest) -> Result<bool, AppError> {
    let result = match request {
        AccessRequest::Organization { id, required } => {
            require_organization(pool, user, id, *required).await.map(|_| ())
        }
        AccessRequest::Task { id, required } => require_task(pool, user, id, *required).await.map(|_| ()),
    };
    match result {
        Ok(()) => Ok(true),
        Err(AppError::NotFound(_)) | Err(AppError::PermissionDenied(_)) => Ok(false),
        Err(err) => Err(err),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Organization,
    Task,
}

/// IDs of every target of `kind` the user may see. `company_id` narrows
/// organizations; `organization_id` narrows tasks to one owning organization.
pub async fn list_visible_ids(
    pool: &SqlitePool,
    user: &Principal,
    kind: TargetKind,
    company_id: Option<&CompanyId>,
    organization_id: Option<&OrganizationId>,
) -> Result<Vec<String>, AppError> {
    match kind {
        TargetKind::Organization => Ok(list_visible_organizations(pool, user, company_id)
            .await?
            .into_iter()
            .map(|org| org.id)
            .collect()),
        TargetKind::Task => {
            let wanted = organization_id.map(|id| id.as_str());
            Ok(list_visible_tasks(pool, user)
                .await?
                .into_iter()
                .filter(|(task, _)| wanted.is_none() || task.organization_id == wanted)
                .map(|(task, _)| task.id)
                .collect())
        }
    }
}

/// Check `user` may administer a whole company: a superuser, or a
/// `SystemAdmin` scope anchored anywhere in its live tree.
pub async fn require_company_admin(
    pool: &SqlitePool,
    user: &Principal,
    company_id: &CompanyId,
) -> Result<(), AppError> {
    if user.is_superuser {
        return Ok(());
    }
    let tree = load_tree(pool, Some(company_id)).await?;
    let scopes = load_scopes(pool, &user.id).await?;
    let reaches = scopes.for_user(&user.id).iter().any(|scope| {
        scope.role == OrgRole::SystemAdmin
            && scope
                .base(user.home_organization_id)
                .is_some_and(|base| tree.contains(&base))
    });
    if reaches {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, %company_id, "company administration denied");
        Err(AppError::denied())
    }
}
