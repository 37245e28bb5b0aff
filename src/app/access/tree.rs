//! Organization tree index.
//!
//! Built from one read of organization rows (all of them, or one company's) and
//! dropped at the end of the request. Every walk carries a visited set, so a
//! corrupt parent chain ends the walk with a warning instead of looping.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::app::domain::{CompanyId, OrganizationId};

/// The slice of an organization row the index needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgNode {
    pub id: OrganizationId,
    pub company_id: CompanyId,
    pub parent_id: Option<OrganizationId>,
    pub level: i64,
}

/// Parent→children adjacency over a set of organizations.
#[derive(Debug, Default)]
pub struct OrgTree {
    nodes: HashMap<OrganizationId, OrgNode>,
    children: HashMap<OrganizationId, Vec<OrganizationId>>,
}

impl OrgTree {
    pub fn build(nodes: impl IntoIterator<Item = OrgNode>) -> Self {
        let mut tree = Self::default();
        for node in nodes {
            if let Some(parent_id) = node.parent_id {
                tree.children.entry(parent_id).or_default().push(node.id);
            }
            tree.nodes.insert(node.id, node);
        }
        tree
    }

    pub fn get(&self, id: &OrganizationId) -> Option<&OrgNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &OrganizationId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &OrgNode> {
        self.nodes.values()
    }

    /// Direct children of `id`, in the order the rows were read.
    pub fn children(&self, id: &OrganizationId) -> &[OrganizationId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `root` plus everything reachable through child edges.
    ///
    /// An id the index has never seen yields just `{root}`.
    pub fn descendants(&self, root: &OrganizationId) -> HashSet<OrganizationId> {
        let mut seen = HashSet::from([*root]);
        let mut stack = vec![*root];
        while let Some(current) = stack.pop() {
            for child in self.children(&current) {
                if !seen.insert(*child) {
                    tracing::warn!(organization_id = %child, root = %root, "cycle in organization tree");
                    continue;
                }
                stack.push(*child);
            }
        }
        seen
    }

    /// Whether `node` is `ancestor` or sits somewhere below it.
    ///
    /// Answers the same question as `descendants(ancestor).contains(node)` by
    /// ascending from `node`, which only touches one path.
    pub fn is_within(&self, node: &OrganizationId, ancestor: &OrganizationId) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(*node);
        while let Some(id) = current {
            if id == *ancestor {
                return true;
            }
            if !seen.insert(id) {
                tracing::warn!(organization_id = %node, "cycle in organization tree");
                return false;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent_id);
        }
        false
    }

    /// Levels for `root` and its subtree when `root` is placed at `root_level`.
    ///
    /// Breadth-first, so parents always come before their children.
    pub fn relevel(&self, root: &OrganizationId, root_level: i64) -> Vec<(OrganizationId, i64)> {
        let mut seen = HashSet::from([*root]);
        let mut queue = VecDeque::from([(*root, root_level)]);
        let mut levels = Vec::new();
        while let Some((id, level)) = queue.pop_front() {
            levels.push((id, level));
            for child in self.children(&id) {
                if seen.insert(*child) {
                    queue.push_back((*child, level + 1));
                } else {
                    tracing::warn!(organization_id = %child, root = %root, "cycle in organization tree");
                }
            }
        }
        levels
    }

    /// Root organizations (no parent) of a company.
    pub fn roots(&self, company_id: &CompanyId) -> Vec<&OrgNode> {
        self.nodes
            .values()
            .filter(|n| n.parent_id.is_none() && n.company_id == *company_id)
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::node;
    use super::*;

    /// a
    /// ├── b
    /// │   └── d
    /// └── c
    fn sample() -> (OrgTree, CompanyId, [OrganizationId; 4]) {
        let company = CompanyId::new();
        let a = node(OrganizationId::new(), company, None);
        let b = node(OrganizationId::new(), company, Some(&a));
        let c = node(OrganizationId::new(), company, Some(&a));
        let d = node(OrganizationId::new(), company, Some(&b));
        let ids = [a.id, b.id, c.id, d.id];
        (OrgTree::build([a, b, c, d]), company, ids)
    }

    #[test]
    fn descendants_include_root_and_whole_subtree() {
        let (tree, _, [a, b, c, d]) = sample();
        assert_eq!(tree.descendants(&a), HashSet::from([a, b, c, d]));
        assert_eq!(tree.descendants(&b), HashSet::from([b, d]));
        assert_eq!(tree.descendants(&c), HashSet::from([c]));
    }

    #[test]
    fn unknown_root_is_its_own_subtree() {
        let (tree, _, _) = sample();
        let stranger = OrganizationId::new();
        assert_eq!(tree.descendants(&stranger), HashSet::from([stranger]));
    }

    #[test]
    fn is_within_agrees_with_descendants() {
        let (tree, _, ids) = sample();
        for ancestor in &ids {
            let below = tree.descendants(ancestor);
            for node in &ids {
                assert_eq!(tree.is_within(node, ancestor), below.contains(node));
            }
        }
    }

    #[test]
    fn cyclic_parent_chain_terminates() {
        let company = CompanyId::new();
        let x = OrganizationId::new();
        let y = OrganizationId::new();
        let tree = OrgTree::build([
            OrgNode { id: x, company_id: company, parent_id: Some(y), level: 1 },
            OrgNode { id: y, company_id: company, parent_id: Some(x), level: 2 },
        ]);
        assert_eq!(tree.descendants(&x), HashSet::from([x, y]));
        assert!(!tree.is_within(&x, &OrganizationId::new()));
        assert_eq!(tree.relevel(&x, 1).len(), 2);
    }

    #[test]
    fn relevel_assigns_depth_below_new_root_level() {
        let (tree, _, [a, b, c, d]) = sample();
        let levels: HashMap<_, _> = tree.relevel(&b, 5).into_iter().collect();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[&b], 5);
        assert_eq!(levels[&d], 6);
        assert!(!levels.contains_key(&a) && !levels.contains_key(&c));
    }

    #[test]
    fn roots_are_per_company() {
        let (tree, company, [a, ..]) = sample();
        let roots = tree.roots(&company);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, a);
        assert!(tree.roots(&CompanyId::new()).is_empty());
    }
}
