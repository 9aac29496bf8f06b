pub mod handlers;
pub mod models;
pub mod routes;

use crate::storage::Database;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared state for the API handlers: the injected store handle and the
/// data-changed signal bumped after every successful mutation.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub notifier: watch::Sender<u64>,
}
