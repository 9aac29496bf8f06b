use super::clock::Clock;
use super::transition::derive_status;
use crate::storage::Database;
use anyhow::Result;

/// Run one reconciliation pass: re-derive the status of every non-completed
/// task and persist the ones that moved. Returns true iff anything changed.
///
/// Each changed row is written back individually; there is no surrounding
/// transaction because every row update is idempotent on its own, so a pass
/// interrupted halfway leaves only rows that are each still valid. A failed
/// read aborts the pass; a failed single-row write or an unparseable schedule
/// is logged and the pass moves on.
pub fn reconcile(db: &Database, clock: &dyn Clock) -> Result<bool> {
    let now = clock.now();
    let tasks = db.list_uncompleted_tasks()?;

    let mut changed = false;
    for mut task in tasks {
        let derived = match derive_status(&task, now) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(task_id = task.id, "leaving status untouched: {e:#}");
                continue;
            }
        };

        if derived != task.status {
            let old = task.status;
            task.status = derived;
            if let Err(e) = db.update_task(&task) {
                tracing::warn!(task_id = task.id, "failed to persist status change: {e:#}");
                continue;
            }
            tracing::debug!(task_id = task.id, "status {old} -> {derived}");
            changed = true;
        }
    }

    Ok(changed)
}
