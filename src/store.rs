//! The published result, shared between the poller and any readers.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::status::DepartureInformation;

/// Holds the latest [`DepartureInformation`].
///
/// Values are swapped in whole; readers get a shared handle to a finished
/// result and never see one under construction.
#[derive(Clone)]
pub struct StatusStore {
    current: Arc<RwLock<Arc<DepartureInformation>>>,
}

impl StatusStore {
    pub fn new(initial: DepartureInformation) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub async fn current(&self) -> Arc<DepartureInformation> {
        self.current.read().await.clone()
    }

    pub async fn publish(&self, information: DepartureInformation) {
        *self.current.write().await = Arc::new(information);
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new(DepartureInformation::no_information())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::DepartureStatus;

    #[tokio::test]
    async fn test_readers_keep_their_snapshot() {
        let store = StatusStore::default();
        let before = store.current().await;

        store
            .publish(DepartureInformation::empty(DepartureStatus::Running))
            .await;

        assert_eq!(before.status, DepartureStatus::NoInformation);
        assert_eq!(store.current().await.status, DepartureStatus::Running);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = StatusStore::default();
        let reader = store.clone();

        store
            .publish(DepartureInformation::empty(DepartureStatus::ClosingTime))
            .await;

        assert_eq!(reader.current().await.status, DepartureStatus::ClosingTime);
    }
}
