use std::collections::{BTreeMap, HashMap};

use crate::app::domain::{OrganizationId, TaskAccessLevel, TaskId, UserId};

/// Task privilege granted to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGrant {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub level: TaskAccessLevel,
}

/// Task privilege granted to every user whose home is `organization_id`.
/// It does not reach users homed in descendant organizations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgGrant {
    pub task_id: TaskId,
    pub organization_id: OrganizationId,
    pub level: TaskAccessLevel,
}

/// Read-only set of task grants, indexed by task.
#[derive(Debug, Default)]
pub struct TaskGrantStore {
    users: HashMap<TaskId, Vec<UserGrant>>,
    organizations: HashMap<TaskId, Vec<OrgGrant>>,
}

impl TaskGrantStore {
    pub fn new(
        user_grants: impl IntoIterator<Item = UserGrant>,
        org_grants: impl IntoIterator<Item = OrgGrant>,
    ) -> Self {
        let mut store = Self::default();
        for grant in user_grants {
            store.users.entry(grant.task_id).or_default().push(grant);
        }
        for grant in org_grants {
            store.organizations.entry(grant.task_id).or_default().push(grant);
        }
        store
    }

    pub fn user_grants(&self, task_id: &TaskId) -> &[UserGrant] {
        self.users.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn org_grants(&self, task_id: &TaskId) -> &[OrgGrant] {
        self.organizations.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Row changes that turn a task's current grants into a submitted full set.
///
/// Entries already present at the submitted level are left alone. When the
/// submission names the same principal twice the last entry wins.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GrantPlan {
    pub user_upserts: Vec<(UserId, TaskAccessLevel)>,
    pub user_removals: Vec<UserId>,
    pub org_upserts: Vec<(OrganizationId, TaskAccessLevel)>,
    pub org_removals: Vec<OrganizationId>,
}

impl GrantPlan {
    pub fn between(
        current_users: &[UserGrant],
        current_orgs: &[OrgGrant],
        desired_users: &[(UserId, TaskAccessLevel)],
        desired_orgs: &[(OrganizationId, TaskAccessLevel)],
    ) -> Self {
        let (user_upserts, user_removals) = diff(
            current_users.iter().map(|g| (g.user_id, g.level)),
            desired_users,
        );
        let (org_upserts, org_removals) = diff(
            current_orgs.iter().map(|g| (g.organization_id, g.level)),
            desired_orgs,
        );
        Self {
            user_upserts,
            user_removals,
            org_upserts,
            org_removals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_upserts.is_empty()
            && self.user_removals.is_empty()
            && self.org_upserts.is_empty()
            && self.org_removals.is_empty()
    }
}

fn diff<K: Ord + Copy>(
    current: impl Iterator<Item = (K, TaskAccessLevel)>,
    desired: &[(K, TaskAccessLevel)],
) -> (Vec<(K, TaskAccessLevel)>, Vec<K>) {
    let current: BTreeMap<K, TaskAccessLevel> = current.collect();
    let desired: BTreeMap<K, TaskAccessLevel> = desired.iter().copied().collect();

    let upserts = desired
        .iter()
        .filter(|(key, level)| current.get(key) != Some(level))
        .map(|(key, level)| (*key, *level))
        .collect();
    let removals = current
        .keys()
        .filter(|key| !desired.contains_key(key))
        .copied()
        .collect();
    (upserts, removals)
}
