pub mod clock;
pub mod diff;
pub mod item;
pub mod order;
pub mod reconcile;
pub mod status;
pub mod transition;

pub use clock::{Clock, FixedClock, SystemClock};
pub use diff::needs_refresh;
pub use item::{DATE_FORMAT, DATE_TIME_FORMAT, TIME_FORMAT, Task};
pub use order::sort_for_display;
pub use reconcile::reconcile;
pub use status::{STATUS_CATALOG, TaskStatus};
pub use transition::derive_status;
