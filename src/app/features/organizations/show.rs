use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::{
    db::{self, Organization},
    domain::{CompanyId, OrgRole, OrganizationId},
    error::AppError,
    session::ActingUser,
    tenant, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct CompanyFilter {
    pub company_id: Option<String>,
}

impl CompanyFilter {
    fn parse(&self) -> Result<Option<CompanyId>, AppError> {
        self.company_id
            .as_deref()
            .map(CompanyId::from_string)
            .transpose()
            .map_err(|_| AppError::Validation("Invalid company_id".to_string()))
    }
}

/// An organization with its visible children nested beneath it.
#[derive(Debug, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub organization: Organization,
    pub children: Vec<TreeNode>,
}

/// GET /api/organizations/:id — One organization the user is at least a member of.
pub async fn show(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Organization>, AppError> {
    let organization = tenant::require_organization(&state.db, &user, &id, OrgRole::Member).await?;
    Ok(Json(organization))
}

/// GET /api/organizations — Every organization the user may see.
pub async fn list(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Query(filter): Query<CompanyFilter>,
) -> Result<Json<Vec<Organization>>, AppError> {
    let company_id = filter.parse()?;
    let organizations = tenant::list_visible_organizations(&state.db, &user, company_id.as_ref()).await?;
    Ok(Json(organizations))
}

/// GET /api/organizations/tree — Visible organizations as nested trees. A node
/// whose parent is not visible is shown as a root.
pub async fn tree(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Query(filter): Query<CompanyFilter>,
) -> Result<Json<Vec<TreeNode>>, AppError> {
    let company_id = filter.parse()?;
    let organizations = tenant::list_visible_organizations(&state.db, &user, company_id.as_ref()).await?;
    Ok(Json(nest(organizations)))
}

/// GET /api/organizations/:id/children — Visible direct children.
pub async fn children(
    ActingUser(user): ActingUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Organization>>, AppError> {
    let parent = tenant::require_organization(&state.db, &user, &id, OrgRole::Member).await?;
    let company_id = CompanyId::from_string(&parent.company_id)?;

    let visible: HashSet<String> = tenant::list_visible_organizations(&state.db, &user, Some(&company_id))
        .await?
        .into_iter()
        .map(|org| org.id)
        .collect();
    let parent_id = OrganizationId::from_string(&parent.id)?;
    let children = db::organizations::list_children(&state.db, &parent_id)
        .await?
        .into_iter()
        .filter(|child| visible.contains(&child.id))
        .collect();
    Ok(Json(children))
}

/// Nest rows under their parents. Rows arrive parents-first.
fn nest(organizations: Vec<Organization>) -> Vec<TreeNode> {
    let ids: HashSet<String> = organizations.iter().map(|org| org.id.clone()).collect();
    let mut roots = Vec::new();
    let mut by_parent: HashMap<String, Vec<Organization>> = HashMap::new();
    for org in organizations {
        match org.parent_id.clone() {
            Some(parent) if ids.contains(&parent) => by_parent.entry(parent).or_default().push(org),
            _ => roots.push(org),
        }
    }

    fn attach(org: Organization, by_parent: &mut HashMap<String, Vec<Organization>>) -> TreeNode {
        let children = by_parent
            .remove(&org.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, by_parent))
            .collect();
        TreeNode {
            organization: org,
            children,
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut by_parent))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: &str, parent: Option<&str>, level: i64) -> Organization {
        Organization {
            id: id.to_string(),
            name: id.to_uppercase(),
            code: id.to_string(),
            company_id: "c".to_string(),
            parent_id: parent.map(str::to_string),
            level,
            deleted: false,
            created_at: 0,
        }
    }

    #[test]
    fn nests_children_under_parents() {
        let tree = nest(vec![
            org("a", None, 1),
            org("b", Some("a"), 2),
            org("c", Some("b"), 3),
            org("d", Some("a"), 2),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].children[0].organization.id, "c");
    }

    #[test]
    fn orphans_become_roots() {
        let tree = nest(vec![org("b", Some("a"), 2), org("c", Some("b"), 3)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].organization.id, "b");
        assert_eq!(tree[0].children[0].organization.id, "c");
    }
}
