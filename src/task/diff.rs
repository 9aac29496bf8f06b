use super::Task;

/// Decide whether a freshly loaded task list differs visibly from the one a
/// consumer last observed.
///
/// Comparison is positional, so both lists must have been produced by the same
/// ordering function over identically filtered data. A length mismatch or any
/// field-wise unequal pair means the consumer needs a full refresh; on refresh
/// the caller replaces its cached list wholesale.
pub fn needs_refresh(previous: &[Task], current: &[Task]) -> bool {
    if previous.len() != current.len() {
        return true;
    }
    previous.iter().zip(current).any(|(old, new)| old != new)
}
