use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a task.
///
/// `Recorded`, `InProgress` and `Expired` are derived from the clock;
/// `Completed` is only ever set by an explicit user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Recorded,
    InProgress,
    Expired,
    Completed,
}

/// Catalog seed order. The status table is populated from this exactly once,
/// so the row ids are stable across runs.
pub const STATUS_CATALOG: [TaskStatus; 4] = [
    TaskStatus::Recorded,
    TaskStatus::InProgress,
    TaskStatus::Expired,
    TaskStatus::Completed,
];

impl TaskStatus {
    /// Name stored in the status table.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Recorded => "recorded",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Expired => "expired",
            TaskStatus::Completed => "completed",
        }
    }

    /// Sort key for display: expired first, completed always last.
    pub fn display_rank(self) -> u8 {
        match self {
            TaskStatus::Expired => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Recorded => 2,
            TaskStatus::Completed => 3,
        }
    }

    pub fn is_completed(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "recorded" => Ok(TaskStatus::Recorded),
            "in_progress" => Ok(TaskStatus::InProgress),
            "expired" => Ok(TaskStatus::Expired),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}
