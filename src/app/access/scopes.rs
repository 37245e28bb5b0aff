use std::collections::HashMap;

use crate::app::domain::{OrgRole, OrganizationId, UserId};

/// A role held by a user at an organization node.
///
/// `organization_id` is optional: a scope without one applies at the
/// holder's home organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub user_id: UserId,
    pub organization_id: Option<OrganizationId>,
    pub role: OrgRole,
}

impl Scope {
    /// Organization the scope is anchored at, falling back to `home`.
    pub fn base(&self, home: Option<OrganizationId>) -> Option<OrganizationId> {
        self.organization_id.or(home)
    }
}

/// Read-only set of scopes, indexed by holder.
#[derive(Debug, Default)]
pub struct ScopeStore {
    by_user: HashMap<UserId, Vec<Scope>>,
}

impl ScopeStore {
    pub fn new(scopes: impl IntoIterator<Item = Scope>) -> Self {
        let mut by_user: HashMap<UserId, Vec<Scope>> = HashMap::new();
        for scope in scopes {
            by_user.entry(scope.user_id).or_default().push(scope);
        }
        Self { by_user }
    }

    pub fn for_user(&self, user_id: &UserId) -> &[Scope] {
        self.by_user.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_user() {
        let alice = UserId::new();
        let bob = UserId::new();
        let org = OrganizationId::new();
        let store = ScopeStore::new([
            Scope { user_id: alice, organization_id: Some(org), role: OrgRole::OrgAdmin },
            Scope { user_id: alice, organization_id: None, role: OrgRole::Member },
            Scope { user_id: bob, organization_id: Some(org), role: OrgRole::Member },
        ]);
        assert_eq!(store.for_user(&alice).len(), 2);
        assert_eq!(store.for_user(&bob).len(), 1);
        assert!(store.for_user(&UserId::new()).is_empty());
    }

    #[test]
    fn base_falls_back_to_home() {
        let home = OrganizationId::new();
        let scope = Scope { user_id: UserId::new(), organization_id: None, role: OrgRole::OrgAdmin };
        assert_eq!(scope.base(Some(home)), Some(home));
        assert_eq!(scope.base(None), None);
    }
}
