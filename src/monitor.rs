use crate::storage::Database;
use crate::task::{Clock, Task, needs_refresh, reconcile, sort_for_display};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Consumer of refreshed task lists (the presentation side of the poll loop).
/// Exactly one sink owns the cached snapshot; the loop hands it a fully built
/// replacement list and never mutates a list it already handed over.
pub trait RefreshSink: Send {
    fn refresh(&mut self, tasks: &[Task]);
}

/// Outcome of one foreground cycle.
pub struct CycleOutcome {
    /// True if the reconciliation pass persisted at least one status change.
    pub changed: bool,
    /// The new ordered list, present only when it differs visibly from the
    /// previous snapshot.
    pub refreshed: Option<Vec<Task>>,
}

/// Bump the data-changed generation. Downstream observers hold the matching
/// `watch::Receiver` and re-read from the store when it ticks.
pub fn notify_changed(notifier: &watch::Sender<u64>) {
    notifier.send_modify(|generation| *generation += 1);
}

/// One foreground cycle: reconcile, reload, order, diff against the previous
/// snapshot. Blocking; callers on an async runtime run it via
/// `spawn_blocking`.
pub fn refresh_cycle(db: &Database, clock: &dyn Clock, previous: &[Task]) -> Result<CycleOutcome> {
    let changed = reconcile(db, clock)?;

    let mut current = db.list_uncompleted_tasks()?;
    sort_for_display(&mut current);

    let refreshed = if needs_refresh(previous, &current) {
        Some(current)
    } else {
        None
    };

    Ok(CycleOutcome { changed, refreshed })
}

/// Foreground poll loop: short-interval refresh cycles feeding the sink.
///
/// A flipped shutdown flag stops new cycles; a cycle already in flight runs to
/// completion and its result is discarded with the loop.
pub async fn poll_loop<S: RefreshSink>(
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    notifier: watch::Sender<u64>,
    mut shutdown: watch::Receiver<bool>,
    mut sink: S,
) -> Result<()> {
    let mut snapshot: Vec<Task> = Vec::new();
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let db = db.clone();
                let clock = clock.clone();
                let previous = snapshot.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    refresh_cycle(&db, clock.as_ref(), &previous)
                })
                .await;

                match outcome {
                    Ok(Ok(cycle)) => {
                        if cycle.changed {
                            notify_changed(&notifier);
                        }
                        if let Some(current) = cycle.refreshed {
                            snapshot = current;
                            notify_changed(&notifier);
                            sink.refresh(&snapshot);
                        }
                    }
                    Ok(Err(e)) => tracing::warn!("refresh cycle failed: {e:#}"),
                    Err(e) => tracing::error!("refresh cycle panicked: {e}"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("poll loop stopping");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Background periodic job: long-interval reconciliation only, no diffing.
/// Lifecycle is independent of the foreground loop.
pub async fn status_worker(
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    notifier: watch::Sender<u64>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let db = db.clone();
                let clock = clock.clone();
                let outcome = tokio::task::spawn_blocking(move || reconcile(&db, clock.as_ref())).await;

                match outcome {
                    Ok(Ok(true)) => notify_changed(&notifier),
                    Ok(Ok(false)) => {}
                    Ok(Err(e)) => tracing::warn!("background reconciliation failed: {e:#}"),
                    Err(e) => tracing::error!("background reconciliation panicked: {e}"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("status worker stopping");
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{FixedClock, TaskStatus};
    use chrono::{Duration as ChronoDuration, Local};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn insert_task_at(db: &Database, name: &str, offset: ChronoDuration) -> i64 {
        let start = Local::now().naive_local() + offset;
        let task = Task::new(
            name.to_string(),
            start.format(crate::task::DATE_FORMAT).to_string(),
            start.format(crate::task::TIME_FORMAT).to_string(),
            1,
        );
        db.insert_task(&task).unwrap()
    }

    fn now_clock() -> FixedClock {
        FixedClock(Local::now().naive_local())
    }

    #[test]
    fn test_first_cycle_always_refreshes_nonempty_store() {
        let db = Database::open_in_memory().unwrap();
        insert_task_at(&db, "future", ChronoDuration::hours(3));

        let cycle = refresh_cycle(&db, &now_clock(), &[]).unwrap();
        assert!(!cycle.changed);
        let list = cycle.refreshed.expect("empty snapshot must refresh");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_steady_state_cycle_is_quiet() {
        let db = Database::open_in_memory().unwrap();
        insert_task_at(&db, "future", ChronoDuration::hours(3));

        let clock = now_clock();
        let snapshot = refresh_cycle(&db, &clock, &[]).unwrap().refreshed.unwrap();
        let second = refresh_cycle(&db, &clock, &snapshot).unwrap();
        assert!(!second.changed);
        assert!(second.refreshed.is_none());
    }

    #[test]
    fn test_cycle_reports_status_changes_and_orders_output() {
        let db = Database::open_in_memory().unwrap();
        insert_task_at(&db, "overdue", ChronoDuration::days(-1));
        insert_task_at(&db, "running", ChronoDuration::minutes(-10));
        insert_task_at(&db, "upcoming", ChronoDuration::hours(5));

        let cycle = refresh_cycle(&db, &now_clock(), &[]).unwrap();
        assert!(cycle.changed);
        let list = cycle.refreshed.unwrap();
        let names: Vec<&str> = list.iter().map(|t| t.short_name.as_str()).collect();
        assert_eq!(names, vec!["overdue", "running", "upcoming"]);
        assert_eq!(list[0].status, TaskStatus::Expired);
    }

    #[test]
    fn test_direct_mutation_is_picked_up_next_cycle() {
        let db = Database::open_in_memory().unwrap();
        insert_task_at(&db, "keep", ChronoDuration::hours(2));

        let clock = now_clock();
        let snapshot = refresh_cycle(&db, &clock, &[]).unwrap().refreshed.unwrap();

        // An edit through the store, no invalidation protocol involved.
        let doomed = insert_task_at(&db, "new", ChronoDuration::hours(4));
        let cycle = refresh_cycle(&db, &clock, &snapshot).unwrap();
        assert_eq!(cycle.refreshed.unwrap().len(), 2);

        db.delete_task_by_id(doomed).unwrap();
        let cycle = refresh_cycle(&db, &clock, &snapshot).unwrap();
        assert!(cycle.refreshed.is_none());
    }

    struct RecordingSink(Arc<Mutex<Vec<Vec<Task>>>>);

    impl RefreshSink for RecordingSink {
        fn refresh(&mut self, tasks: &[Task]) {
            self.0.lock().unwrap().push(tasks.to_vec());
        }
    }

    #[tokio::test]
    async fn test_poll_loop_pushes_refresh_then_stops_on_shutdown() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        insert_task_at(&db, "only", ChronoDuration::hours(1));

        let (notify_tx, notify_rx) = watch::channel(0u64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handle = tokio::spawn(poll_loop(
            db.clone(),
            Arc::new(now_clock()),
            Duration::from_millis(10),
            notify_tx,
            shutdown_rx,
            RecordingSink(seen.clone()),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        let refreshes = seen.lock().unwrap();
        assert_eq!(refreshes.len(), 1, "steady state must not re-refresh");
        assert_eq!(refreshes[0][0].short_name, "only");
        assert!(*notify_rx.borrow() >= 1);
    }

    #[tokio::test]
    async fn test_status_worker_notifies_on_change() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        insert_task_at(&db, "overdue", ChronoDuration::days(-1));

        let (notify_tx, notify_rx) = watch::channel(0u64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(status_worker(
            db.clone(),
            Arc::new(now_clock()),
            Duration::from_millis(10),
            notify_tx,
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        // First tick transitions the task, later ticks are idempotent.
        assert_eq!(*notify_rx.borrow(), 1);
        assert_eq!(
            db.list_all_tasks().unwrap()[0].status,
            TaskStatus::Expired
        );
    }
}
