use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Administrative role a user holds at an organization node.
///
/// Ordering between roles is defined by the priority table in
/// `access::priority`, never by variant order or by the stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")] // Serialize as snake_case string
#[strum(serialize_all = "snake_case")] // Display/FromStr as snake_case string
pub enum OrgRole {
    Member,
    OrgAdmin,
    SystemAdmin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_names() {
        assert_eq!("member".parse::<OrgRole>().unwrap(), OrgRole::Member);
        assert_eq!("org_admin".parse::<OrgRole>().unwrap(), OrgRole::OrgAdmin);
        assert_eq!("system_admin".parse::<OrgRole>().unwrap(), OrgRole::SystemAdmin);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!("owner".parse::<OrgRole>().is_err());
        assert!("ORG_ADMIN".parse::<OrgRole>().is_err());
    }

    #[test]
    fn display_matches_storage_form() {
        assert_eq!(OrgRole::OrgAdmin.to_string(), "org_admin");
    }
}
