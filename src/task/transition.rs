use super::{Task, TaskStatus};
use anyhow::Result;
use chrono::NaiveDateTime;

/// Compute the correct status for `task` at `now`.
///
/// Pure: never touches storage. `completed` is absorbing and is only ever set
/// manually. For everything else the schedule decides, with boundaries
/// resolving to the later state: `now == start` is already in progress and
/// `now == end` is already expired.
///
/// Returns an error if the stored date/time does not parse; the caller is
/// expected to log it and leave the task's status alone.
pub fn derive_status(task: &Task, now: NaiveDateTime) -> Result<TaskStatus> {
    if task.status.is_completed() {
        return Ok(TaskStatus::Completed);
    }

    let start = task.start_timestamp()?;
    let end = start + chrono::Duration::hours(task.duration_hours);

    if now >= end {
        Ok(TaskStatus::Expired)
    } else if now >= start {
        Ok(TaskStatus::InProgress)
    } else {
        Ok(TaskStatus::Recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn task_at(date: &str, time: &str, duration_hours: i64) -> Task {
        Task::new(
            "Test task".to_string(),
            date.to_string(),
            time.to_string(),
            duration_hours,
        )
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_before_start_is_recorded() {
        let task = task_at("10/06/2025", "14:00", 2);
        assert_eq!(derive_status(&task, at(13, 59)).unwrap(), TaskStatus::Recorded);
    }

    #[test]
    fn test_at_start_is_in_progress() {
        // Inclusive boundary: the tick of the start minute counts.
        let task = task_at("10/06/2025", "14:00", 2);
        assert_eq!(
            derive_status(&task, at(14, 0)).unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_during_window_is_in_progress() {
        let task = task_at("10/06/2025", "14:00", 2);
        assert_eq!(
            derive_status(&task, at(15, 30)).unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_at_end_is_expired() {
        // Inclusive boundary on the other side too.
        let task = task_at("10/06/2025", "14:00", 2);
        assert_eq!(derive_status(&task, at(16, 0)).unwrap(), TaskStatus::Expired);
    }

    #[test]
    fn test_after_end_is_expired() {
        let task = task_at("10/06/2025", "14:00", 2);
        assert_eq!(derive_status(&task, at(23, 0)).unwrap(), TaskStatus::Expired);
    }

    #[test]
    fn test_completed_is_absorbing() {
        let mut task = task_at("10/06/2025", "14:00", 2);
        task.status = TaskStatus::Completed;
        for now in [at(0, 0), at(14, 0), at(16, 0), at(23, 59)] {
            assert_eq!(derive_status(&task, now).unwrap(), TaskStatus::Completed);
        }
    }

    #[test]
    fn test_unparseable_schedule_is_an_error() {
        let task = task_at("tomorrow", "noon", 1);
        assert!(derive_status(&task, at(12, 0)).is_err());
    }

    #[test]
    fn test_monotonic_as_time_advances() {
        // recorded -> in_progress -> expired; the derived tier never regresses
        // as now increases.
        let task = task_at("10/06/2025", "09:00", 1);
        let mut now = at(0, 0);
        let mut last_rank = 255u8;
        while now <= at(23, 0) {
            // Ranks run expired=0 .. recorded=2, so "later in life" is lower.
            let rank = derive_status(&task, now).unwrap().display_rank();
            assert!(rank <= last_rank, "status regressed at {now}");
            last_rank = rank;
            now += Duration::minutes(15);
        }
        assert_eq!(last_rank, TaskStatus::Expired.display_rank());
    }
}
