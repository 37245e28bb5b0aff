pub mod access_scopes;
pub mod companies;
pub mod objectives;
pub mod organizations;
pub mod progress_updates;
pub mod task_access;
pub mod task_orders;
pub mod tasks;
pub mod users;

pub use organizations::Organization;
pub use tasks::Task;
pub use users::{NewUser, User};
