use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Progress state shared by tasks, objectives and progress notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    OnHold,
}
