//! Versioned snapshot handle shared across concurrent searches.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use super::store::ScheduleStore;

/// A store snapshot tagged with the version it was published as.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub store: Arc<ScheduleStore>,
}

/// Holds the current schedule snapshot.
///
/// Searches take an `Arc` to the store and keep using it for their whole
/// lifetime; a reload publishes a new store without touching the old one.
#[derive(Debug)]
pub struct ScheduleHandle {
    current: RwLock<Snapshot>,
}

impl ScheduleHandle {
    /// Publish an initial store as version 1.
    pub fn new(store: ScheduleStore) -> Self {
        Self {
            current: RwLock::new(Snapshot {
                version: 1,
                store: Arc::new(store),
            }),
        }
    }

    /// Returns the current snapshot.
    pub async fn current(&self) -> Snapshot {
        self.current.read().await.clone()
    }

    /// Swap in a new store, returning the version it was published as.
    pub async fn replace(&self, store: ScheduleStore) -> u64 {
        let mut current = self.current.write().await;
        current.version += 1;
        current.store = Arc::new(store);
        info!(version = current.version, "schedule snapshot replaced");
        current.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleSnapshot;

    #[tokio::test]
    async fn replace_bumps_version_and_keeps_old_snapshot_alive() {
        let handle = ScheduleHandle::new(ScheduleStore::default());
        let before = handle.current().await;
        assert_eq!(before.version, 1);

        let (store, _) = ScheduleStore::from_snapshot(ScheduleSnapshot::default());
        assert_eq!(handle.replace(store).await, 2);

        let after = handle.current().await;
        assert_eq!(after.version, 2);
        assert!(!Arc::ptr_eq(&before.store, &after.store));
        // The old snapshot is still usable by whoever holds it
        assert_eq!(before.store.stop_count(), 0);
    }
}
