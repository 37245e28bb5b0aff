//! Total orders over the two privilege enumerations.
//!
//! "Is X enough for Y" is always an integer comparison on these tables.

use crate::app::domain::{OrgRole, TaskAccessLevel};

/// A privilege with a position in a total order.
pub trait Ranked: Copy {
    fn priority(self) -> u8;
}

impl Ranked for OrgRole {
    fn priority(self) -> u8 {
        match self {
            OrgRole::Member => 1,
            OrgRole::OrgAdmin => 2,
            OrgRole::SystemAdmin => 3,
        }
    }
}

impl Ranked for TaskAccessLevel {
    fn priority(self) -> u8 {
        match self {
            TaskAccessLevel::View => 1,
            TaskAccessLevel::Edit => 2,
            TaskAccessLevel::Full => 3,
            TaskAccessLevel::Owner => 4,
        }
    }
}

/// `true` when `have` ranks at or above `need`.
pub fn sufficient<T: Ranked>(have: T, need: T) -> bool {
    have.priority() >= need.priority()
}

/// The higher-ranked of two optional privileges.
pub fn highest<T: Ranked>(current: Option<T>, candidate: T) -> Option<T> {
    match current {
        Some(held) if held.priority() >= candidate.priority() => Some(held),
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn org_roles_ascend() {
        assert!(OrgRole::Member.priority() < OrgRole::OrgAdmin.priority());
        assert!(OrgRole::OrgAdmin.priority() < OrgRole::SystemAdmin.priority());
    }

    #[test]
    fn task_levels_ascend() {
        let ranks: Vec<u8> = TaskAccessLevel::iter().map(Ranked::priority).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn sufficient_is_reflexive_and_ordered() {
        for have in TaskAccessLevel::iter() {
            for need in TaskAccessLevel::iter() {
                assert_eq!(sufficient(have, need), have.priority() >= need.priority());
            }
            assert!(sufficient(have, have));
        }
        assert!(sufficient(OrgRole::SystemAdmin, OrgRole::Member));
        assert!(!sufficient(OrgRole::Member, OrgRole::OrgAdmin));
    }

    #[test]
    fn highest_keeps_the_stronger() {
        let level = highest(None, TaskAccessLevel::Edit);
        let level = highest(level, TaskAccessLevel::View);
        assert_eq!(level, Some(TaskAccessLevel::Edit));
        assert_eq!(highest(level, TaskAccessLevel::Owner), Some(TaskAccessLevel::Owner));
    }
}
