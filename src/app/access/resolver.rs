//! Allow/deny decisions for organizations and tasks.
//!
//! Organization checks inherit down the tree for administrative roles. Task
//! checks never inherit: a grant to an organization reaches only users whose
//! home is exactly that organization.

use crate::app::domain::{OrgRole, OrganizationId, TaskAccessLevel, TaskId, UserId};

use super::grants::TaskGrantStore;
use super::priority::{highest, sufficient};
use super::scopes::ScopeStore;
use super::tree::OrgTree;

/// The acting user, as the engine sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub home_organization_id: Option<OrganizationId>,
    pub is_superuser: bool,
}

/// The fields of a task that take part in access decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub id: TaskId,
    pub created_by: Option<UserId>,
    pub deleted: bool,
}

/// Organization-level resolver over one request's tree and scopes.
pub struct AccessResolver<'a> {
    tree: &'a OrgTree,
    scopes: &'a ScopeStore,
}

impl<'a> AccessResolver<'a> {
    pub fn new(tree: &'a OrgTree, scopes: &'a ScopeStore) -> Self {
        Self { tree, scopes }
    }

    /// Strongest role `user` holds over `target`, or `None` when no scope applies.
    ///
    /// Superusers are not special-cased here; see `can_access_organization`.
    pub fn effective_org_role(&self, user: &Principal, target: &OrganizationId) -> Option<OrgRole> {
        let target_node = self.tree.get(target)?;
        let home = user.home_organization_id;

        let mut best = None;
        if home == Some(*target) {
            best = highest(best, OrgRole::Member);
        }

        for scope in self.scopes.for_user(&user.id) {
            let Some(base) = scope.base(home) else {
                continue;
            };
            match scope.role {
                OrgRole::SystemAdmin => {
                    let same_company = self
                        .tree
                        .get(&base)
                        .is_some_and(|n| n.company_id == target_node.company_id);
                    if same_company {
                        return Some(OrgRole::SystemAdmin);
                    }
                }
                OrgRole::OrgAdmin => {
                    if self.tree.is_within(target, &base) {
                        best = highest(best, OrgRole::OrgAdmin);
                    }
                }
                OrgRole::Member => {
                    if base == *target {
                        best = highest(best, OrgRole::Member);
                    }
                }
            }
        }
        best
    }

    pub fn can_access_organization(
        &self,
        user: &Principal,
        target: &OrganizationId,
        required: OrgRole,
    ) -> bool {
        if user.is_superuser {
            return true;
        }
        let allowed = self
            .effective_org_role(user, target)
            .is_some_and(|held| sufficient(held, required));
        if !allowed {
            tracing::debug!(user_id = %user.id, organization_id = %target, %required, "organization access denied");
        }
        allowed
    }
}

/// Strongest level `user` holds on `task`. Creators and superusers hold `Owner`.
pub fn effective_task_level(
    user: &Principal,
    task: &TaskRef,
    grants: &TaskGrantStore,
) -> Option<TaskAccessLevel> {
    if task.deleted {
        return None;
    }
    if user.is_superuser || task.created_by == Some(user.id) {
        return Some(TaskAccessLevel::Owner);
    }

    let mut best = None;
    for grant in grants.user_grants(&task.id) {
        if grant.user_id == user.id {
            best = highest(best, grant.level);
        }
    }
    if let Some(home) = user.home_organization_id {
        for grant in grants.org_grants(&task.id) {
            if grant.organization_id == home {
                best = highest(best, grant.level);
            }
        }
    }
    best
}

pub fn can_access_task(
    user: &Principal,
    task: &TaskRef,
    grants: &TaskGrantStore,
    required: TaskAccessLevel,
) -> bool {
    let allowed = effective_task_level(user, task, grants).is_some_and(|held| sufficient(held, required));
    if !allowed {
        tracing::debug!(user_id = %user.id, task_id = %task.id, %required, "task access denied");
    }
    allowed
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::app::access::grants::{OrgGrant, UserGrant};
    use crate::app::access::scopes::Scope;
    use crate::app::access::tree::fixtures::node;
    use crate::app::domain::CompanyId;

    fn principal(home: Option<OrganizationId>) -> Principal {
        Principal {
            id: UserId::new(),
            home_organization_id: home,
            is_superuser: false,
        }
    }

    fn scope(user: &Principal, org: Option<OrganizationId>, role: OrgRole) -> Scope {
        Scope {
            user_id: user.id,
            organization_id: org,
            role,
        }
    }

    /// Company C: a (root) → b → c, plus a sibling s under a.
    /// Company D: a single root z.
    struct World {
        tree: OrgTree,
        a: OrganizationId,
        b: OrganizationId,
        c: OrganizationId,
        s: OrganizationId,
        z: OrganizationId,
    }

    fn world() -> World {
        let company = CompanyId::new();
        let other = CompanyId::new();
        let a = node(OrganizationId::new(), company, None);
        let b = node(OrganizationId::new(), company, Some(&a));
        let c = node(OrganizationId::new(), company, Some(&b));
        let s = node(OrganizationId::new(), company, Some(&a));
        let z = node(OrganizationId::new(), other, None);
        let ids = (a.id, b.id, c.id, s.id, z.id);
        World {
            tree: OrgTree::build([a, b, c, s, z]),
            a: ids.0,
            b: ids.1,
            c: ids.2,
            s: ids.3,
            z: ids.4,
        }
    }

    #[test]
    fn org_admin_at_root_administers_child() {
        let w = world();
        let u = principal(None);
        let scopes = ScopeStore::new([scope(&u, Some(w.a), OrgRole::OrgAdmin)]);
        let resolver = AccessResolver::new(&w.tree, &scopes);

        assert!(resolver.can_access_organization(&u, &w.b, OrgRole::OrgAdmin));
        assert!(resolver.can_access_organization(&u, &w.c, OrgRole::OrgAdmin));
        assert!(!resolver.can_access_organization(&u, &w.b, OrgRole::SystemAdmin));
    }

    #[test]
    fn org_admin_does_not_reach_siblings_or_ancestors() {
        let w = world();
        let u = principal(None);
        let scopes = ScopeStore::new([scope(&u, Some(w.b), OrgRole::OrgAdmin)]);
        let resolver = AccessResolver::new(&w.tree, &scopes);

        assert!(resolver.can_access_organization(&u, &w.b, OrgRole::OrgAdmin));
        assert!(resolver.can_access_organization(&u, &w.c, OrgRole::OrgAdmin));
        assert!(!resolver.can_access_organization(&u, &w.a, OrgRole::Member));
        assert!(!resolver.can_access_organization(&u, &w.s, OrgRole::Member));
        assert!(!resolver.can_access_organization(&u, &w.z, OrgRole::Member));
    }

    #[test]
    fn org_admin_without_organization_uses_home() {
        let w = world();
        let u = principal(Some(w.b));
        let scopes = ScopeStore::new([scope(&u, None, OrgRole::OrgAdmin)]);
        let resolver = AccessResolver::new(&w.tree, &scopes);

        assert!(resolver.can_access_organization(&u, &w.c, OrgRole::OrgAdmin));
        assert!(!resolver.can_access_organization(&u, &w.s, OrgRole::Member));
    }

    #[test]
    fn system_admin_spans_its_company_only() {
        let w = world();
        let u = principal(None);
        let scopes = ScopeStore::new([scope(&u, Some(w.s), OrgRole::SystemAdmin)]);
        let resolver = AccessResolver::new(&w.tree, &scopes);

        assert!(resolver.can_access_organization(&u, &w.b, OrgRole::SystemAdmin));
        assert!(resolver.can_access_organization(&u, &w.a, OrgRole::SystemAdmin));
        assert!(!resolver.can_access_organization(&u, &w.z, OrgRole::Member));
    }

    #[test]
    fn member_scope_and_home_are_exact_matches() {
        let w = world();
        let u = principal(Some(w.s));
        let scopes = ScopeStore::new([scope(&u, Some(w.b), OrgRole::Member)]);
        let resolver = AccessResolver::new(&w.tree, &scopes);

        assert!(resolver.can_access_organization(&u, &w.s, OrgRole::Member));
        assert!(resolver.can_access_organization(&u, &w.b, OrgRole::Member));
        assert!(!resolver.can_access_organization(&u, &w.b, OrgRole::OrgAdmin));
        assert!(!resolver.can_access_organization(&u, &w.c, OrgRole::Member));
    }

    #[test]
    fn effective_role_takes_maximum_across_scopes() {
        let w = world();
        let u = principal(Some(w.c));
        let scopes = ScopeStore::new([
            scope(&u, Some(w.c), OrgRole::Member),
            scope(&u, Some(w.b), OrgRole::OrgAdmin),
        ]);
        let resolver = AccessResolver::new(&w.tree, &scopes);
        assert_eq!(resolver.effective_org_role(&u, &w.c), Some(OrgRole::OrgAdmin));
    }

    #[test]
    fn unknown_or_deleted_target_is_denied() {
        let w = world();
        let u = principal(None);
        let scopes = ScopeStore::new([scope(&u, Some(w.a), OrgRole::SystemAdmin)]);
        let resolver = AccessResolver::new(&w.tree, &scopes);
        assert!(!resolver.can_access_organization(&u, &OrganizationId::new(), OrgRole::Member));
    }

    #[test]
    fn superuser_bypasses_everything() {
        let w = world();
        let mut u = principal(None);
        u.is_superuser = true;
        let scopes = ScopeStore::default();
        let resolver = AccessResolver::new(&w.tree, &scopes);
        for role in OrgRole::iter() {
            assert!(resolver.can_access_organization(&u, &w.z, role));
            assert!(resolver.can_access_organization(&u, &OrganizationId::new(), role));
        }

        let task = TaskRef { id: TaskId::new(), created_by: None, deleted: false };
        for level in TaskAccessLevel::iter() {
            assert!(can_access_task(&u, &task, &TaskGrantStore::default(), level));
        }
    }

    #[test]
    fn creator_holds_every_level() {
        let creator = principal(None);
        let task = TaskRef { id: TaskId::new(), created_by: Some(creator.id), deleted: false };
        for level in TaskAccessLevel::iter() {
            assert!(can_access_task(&creator, &task, &TaskGrantStore::default(), level));
        }
    }

    #[test]
    fn member_of_task_org_without_grant_is_denied() {
        let w = world();
        let x = principal(Some(w.b));
        let y = principal(Some(w.b));
        let task = TaskRef { id: TaskId::new(), created_by: Some(x.id), deleted: false };
        assert!(!can_access_task(&y, &task, &TaskGrantStore::default(), TaskAccessLevel::View));
    }

    #[test]
    fn org_grant_reaches_home_members_up_to_its_level() {
        let w = world();
        let y = principal(Some(w.b));
        let task = TaskRef { id: TaskId::new(), created_by: Some(UserId::new()), deleted: false };
        let grants = TaskGrantStore::new(
            [],
            [OrgGrant { task_id: task.id, organization_id: w.b, level: TaskAccessLevel::Edit }],
        );
        assert!(can_access_task(&y, &task, &grants, TaskAccessLevel::Edit));
        assert!(can_access_task(&y, &task, &grants, TaskAccessLevel::View));
        assert!(!can_access_task(&y, &task, &grants, TaskAccessLevel::Full));
    }

    #[test]
    fn org_grant_does_not_reach_child_organizations() {
        let w = world();
        let child_member = principal(Some(w.c));
        let task = TaskRef { id: TaskId::new(), created_by: None, deleted: false };
        let grants = TaskGrantStore::new(
            [],
            [OrgGrant { task_id: task.id, organization_id: w.b, level: TaskAccessLevel::Owner }],
        );
        assert!(!can_access_task(&child_member, &task, &grants, TaskAccessLevel::View));
    }

    #[test]
    fn user_and_org_grants_combine_to_the_highest() {
        let w = world();
        let u = principal(Some(w.b));
        let task = TaskRef { id: TaskId::new(), created_by: None, deleted: false };
        let grants = TaskGrantStore::new(
            [UserGrant { task_id: task.id, user_id: u.id, level: TaskAccessLevel::View }],
            [OrgGrant { task_id: task.id, organization_id: w.b, level: TaskAccessLevel::Full }],
        );
        assert_eq!(effective_task_level(&u, &task, &grants), Some(TaskAccessLevel::Full));
    }

    #[test]
    fn deleted_task_is_denied_even_to_creator() {
        let creator = principal(None);
        let task = TaskRef { id: TaskId::new(), created_by: Some(creator.id), deleted: true };
        assert!(!can_access_task(&creator, &task, &TaskGrantStore::default(), TaskAccessLevel::View));
    }

    fn arb_level() -> impl Strategy<Value = TaskAccessLevel> {
        prop::sample::select(TaskAccessLevel::iter().collect::<Vec<_>>())
    }

    fn arb_role() -> impl Strategy<Value = OrgRole> {
        prop::sample::select(OrgRole::iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn task_access_is_monotone(user_level in proptest::option::of(arb_level()), org_level in proptest::option::of(arb_level())) {
            let home = OrganizationId::new();
            let u = principal(Some(home));
            let task = TaskRef { id: TaskId::new(), created_by: None, deleted: false };
            let grants = TaskGrantStore::new(
                user_level.map(|level| UserGrant { task_id: task.id, user_id: u.id, level }),
                org_level.map(|level| OrgGrant { task_id: task.id, organization_id: home, level }),
            );
            let allowed: Vec<bool> = TaskAccessLevel::iter()
                .map(|level| can_access_task(&u, &task, &grants, level))
                .collect();
            for pair in allowed.windows(2) {
                prop_assert!(pair[0] || !pair[1]);
            }
        }

        #[test]
        fn org_access_is_monotone(roles in prop::collection::vec((0usize..5, arb_role()), 0..4), target in 0usize..5) {
            let w = world();
            let ids = [w.a, w.b, w.c, w.s, w.z];
            let u = principal(Some(ids[target]));
            let scopes = ScopeStore::new(roles.iter().map(|(at, role)| scope(&u, Some(ids[*at]), *role)));
            let resolver = AccessResolver::new(&w.tree, &scopes);
            for id in ids {
                let allowed: Vec<bool> = OrgRole::iter()
                    .map(|role| resolver.can_access_organization(&u, &id, role))
                    .collect();
                for pair in allowed.windows(2) {
                    prop_assert!(pair[0] || !pair[1]);
                }
            }
        }
    }
}
