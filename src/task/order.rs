use super::Task;
use std::cmp::Ordering;

/// Sort tasks for display: expired first, then in progress, then recorded,
/// with completed tasks always at the bottom. Ties within a tier are broken by
/// ascending scheduled start. Stable, so equal keys keep their relative order.
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(compare_for_display);
}

fn compare_for_display(a: &Task, b: &Task) -> Ordering {
    let by_tier = a.status.display_rank().cmp(&b.status.display_rank());
    if by_tier != Ordering::Equal {
        return by_tier;
    }

    // Degraded mode: a pair with an unparseable schedule compares equal, which
    // keeps the sort total and the unparseable task in a stable position.
    match (a.start_timestamp(), b.start_timestamp()) {
        (Ok(start_a), Ok(start_b)) => start_a.cmp(&start_b),
        _ => Ordering::Equal,
    }
}
