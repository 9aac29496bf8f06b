use super::TaskStatus;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format for the combined `date start_time` schedule string.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Format of the stored date field on its own.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Format of the stored start time field on its own.
pub const TIME_FORMAT: &str = "%H:%M";

/// A schedulable task.
///
/// Date and start time are kept as text in the stored format; they are parsed
/// on demand, and an unparseable schedule is a recoverable per-task condition
/// rather than a constructor failure.
///
/// Field-wise equality (the derived `PartialEq`) is exactly the snapshot
/// comparison used by change detection, so keep the field set in sync with
/// what the store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned row id; 0 until the task has been inserted.
    pub id: i64,
    pub short_name: String,
    pub description: Option<String>,
    /// `dd/MM/yyyy`
    pub date: String,
    /// `HH:mm`, 24-hour
    pub start_time: String,
    /// Whole hours, always >= 1.
    pub duration_hours: i64,
    pub location: Option<String>,
    pub status: TaskStatus,
}

impl Task {
    /// New unsaved task. Tasks always start out `recorded`.
    pub fn new(short_name: String, date: String, start_time: String, duration_hours: i64) -> Self {
        Self {
            id: 0,
            short_name,
            description: None,
            date,
            start_time,
            duration_hours,
            location: None,
            status: TaskStatus::Recorded,
        }
    }

    /// Scheduled start, parsed from the stored date and time.
    pub fn start_timestamp(&self) -> Result<NaiveDateTime> {
        let combined = format!("{} {}", self.date, self.start_time);
        NaiveDateTime::parse_from_str(&combined, DATE_TIME_FORMAT)
            .with_context(|| format!("Invalid task schedule: {combined:?}"))
    }

    /// Scheduled end: start plus duration. Derived, never stored.
    pub fn end_timestamp(&self) -> Result<NaiveDateTime> {
        Ok(self.start_timestamp()? + Duration::hours(self.duration_hours))
    }
}
