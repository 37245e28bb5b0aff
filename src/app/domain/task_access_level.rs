use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Per-task privilege carried by a grant to a user or an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskAccessLevel {
    View,
    Edit,
    Full,
    Owner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_names() {
        assert_eq!("view".parse::<TaskAccessLevel>().unwrap(), TaskAccessLevel::View);
        assert_eq!("owner".parse::<TaskAccessLevel>().unwrap(), TaskAccessLevel::Owner);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!("admin".parse::<TaskAccessLevel>().is_err());
    }
}
