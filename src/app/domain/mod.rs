pub mod company_id;
pub mod due_date;
pub mod email;
pub mod org_role;
pub mod organization_id;
pub mod task_access_level;
pub mod task_id;
pub mod user_id;
pub mod work_status;

pub use company_id::CompanyId;
pub use due_date::DueDate;
pub use email::Email;
pub use org_role::OrgRole;
pub use organization_id::OrganizationId;
pub use task_access_level::TaskAccessLevel;
pub use task_id::TaskId;
pub use user_id::UserId;
pub use work_status::WorkStatus;
