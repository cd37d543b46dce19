use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::models::Pm2Process;

/// The result of one successful `pm2 jlist` collection cycle.
///
/// Immutable once published: the collector builds a fresh `Snapshot` and
/// swaps it in wholesale, so a reader always sees records and timestamp
/// from the same cycle.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Records in the order pm2 returned them.
    pub processes: Vec<Pm2Process>,
    /// Wall-clock time of the last successful collection. `None` until
    /// the first cycle succeeds.
    pub last_fetch: Option<SystemTime>,
}

/// Collector is the sole writer; scrape handlers only ever clone the
/// inner `Arc` and read from it unlocked.
pub type AppState = Arc<RwLock<Arc<Snapshot>>>;

pub fn new_state() -> AppState {
    Arc::new(RwLock::new(Arc::new(Snapshot::default())))
}

/// Cheap read: clone the current snapshot handle.
pub fn current_snapshot(state: &AppState) -> Arc<Snapshot> {
    state.read().unwrap().clone()
}

/// Replace the live snapshot in one swap.
pub fn publish_snapshot(state: &AppState, snapshot: Snapshot) {
    *state.write().unwrap() = Arc::new(snapshot);
}
