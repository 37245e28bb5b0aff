//! Batch forms of the resolver: every organization or task a user may see.
//!
//! These must agree element-for-element with `AccessResolver` at `Member`
//! and with `can_access_task` at `View`.

use std::collections::HashSet;

use crate::app::domain::{OrgRole, OrganizationId, TaskAccessLevel, TaskId};

use super::grants::TaskGrantStore;
use super::resolver::{effective_task_level, Principal, TaskRef};
use super::scopes::ScopeStore;
use super::tree::OrgTree;

/// Organizations in `tree` that `user` may see. The tree is the candidate set.
pub fn visible_organizations(
    user: &Principal,
    tree: &OrgTree,
    scopes: &ScopeStore,
) -> HashSet<OrganizationId> {
    if user.is_superuser {
        return tree.nodes().map(|n| n.id).collect();
    }

    let home = user.home_organization_id;
    let mut admin_companies = HashSet::new();
    let mut visible = HashSet::new();

    for scope in scopes.for_user(&user.id) {
        let Some(base) = scope.base(home) else {
            continue;
        };
        match scope.role {
            OrgRole::SystemAdmin => {
                if let Some(node) = tree.get(&base) {
                    admin_companies.insert(node.company_id);
                }
            }
            OrgRole::OrgAdmin => {
                visible.extend(tree.descendants(&base).into_iter().filter(|id| tree.contains(id)));
            }
            OrgRole::Member => {
                if tree.contains(&base) {
                    visible.insert(base);
                }
            }
        }
    }

    if let Some(home) = home.filter(|h| tree.contains(h)) {
        visible.insert(home);
    }

    if !admin_companies.is_empty() {
        visible.extend(
            tree.nodes()
                .filter(|n| admin_companies.contains(&n.company_id))
                .map(|n| n.id),
        );
    }

    visible
}

/// A task the user may see, with the strongest level they hold on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleTask {
    pub task_id: TaskId,
    pub effective_level: TaskAccessLevel,
}

/// Attach effective levels to the candidates of the task visibility query.
///
/// `candidates` are the rows the store matched by creator, user grant or home
/// organization grant; `grants` holds the user's own grant rows for them.
/// Deleted candidates are dropped.
pub fn visible_tasks(
    user: &Principal,
    candidates: &[TaskRef],
    grants: &TaskGrantStore,
) -> Vec<VisibleTask> {
    candidates
        .iter()
        .filter(|task| !task.deleted)
        .map(|task| {
            let effective_level = effective_task_level(user, task, grants).unwrap_or_else(|| {
                tracing::warn!(user_id = %user.id, task_id = %task.id, "visible task matched no grant; defaulting to view");
                TaskAccessLevel::View
            });
            VisibleTask {
                task_id: task.id,
                effective_level,
            }
        })
        .collect()
}
