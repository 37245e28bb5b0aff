//! Access-control resolution engine.
//!
//! Pure, synchronous decisions over data loaded for one request. Loading and
//! the translation of a denial into an error live in `app::tenant`.

pub mod grants;
pub mod priority;
pub mod resolver;
pub mod scopes;
pub mod tree;
pub mod visibility;

pub use grants::{GrantPlan, OrgGrant, TaskGrantStore, UserGrant};
pub use priority::{sufficient, Ranked};
pub use resolver::{can_access_task, effective_task_level, AccessResolver, Principal, TaskRef};
pub use scopes::{Scope, ScopeStore};
pub use tree::{OrgNode, OrgTree};
pub use visibility::{visible_organizations, visible_tasks, VisibleTask};
