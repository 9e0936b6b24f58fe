use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::link_store::StoreError;
use crate::application::ports::snapshot_store::{FailurePolicy, SnapshotStore};
use crate::domain::links::link::Snapshot;
use crate::infrastructure::storage::local::LocalSnapshotStore;

/// Puts the local store behind a remote snapshot store. Without a primary
/// every call goes local; with one, failures go local only under
/// `FailurePolicy::FallbackLocal`.
pub struct FallbackSnapshotStore {
    primary: Option<Arc<dyn SnapshotStore>>,
    local: LocalSnapshotStore,
    policy: FailurePolicy,
}

impl FallbackSnapshotStore {
    pub fn new(
        primary: Option<Arc<dyn SnapshotStore>>,
        local: LocalSnapshotStore,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            primary,
            local,
            policy,
        }
    }

    fn primary(&self) -> Result<Option<&Arc<dyn SnapshotStore>>, StoreError> {
        match (&self.primary, self.policy) {
            (Some(p), _) => Ok(Some(p)),
            (None, FailurePolicy::FallbackLocal) => {
                tracing::warn!("snapshot_backend_not_configured_using_local_store");
                Ok(None)
            }
            (None, FailurePolicy::Fail) => Err(StoreError::Configuration(
                "no snapshot backend is configured".into(),
            )),
        }
    }
}

#[async_trait]
impl SnapshotStore for FallbackSnapshotStore {
    fn backend_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map(|p| p.backend_name())
            .unwrap_or("local")
    }

    async fn load(&self) -> Result<Snapshot, StoreError> {
        let Some(primary) = self.primary()? else {
            return Ok(self.local.get().await);
        };
        match primary.load().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if self.policy == FailurePolicy::FallbackLocal => {
                tracing::error!(error = %e, backend = primary.backend_name(), "snapshot_load_failed_using_local");
                Ok(self.local.get().await)
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, snapshot: Snapshot) -> Result<Snapshot, StoreError> {
        let Some(primary) = self.primary()? else {
            return Ok(self.local.put(snapshot).await);
        };
        let copy = match self.policy {
            FailurePolicy::FallbackLocal => Some(snapshot.clone()),
            FailurePolicy::Fail => None,
        };
        match (primary.save(snapshot).await, copy) {
            (Ok(saved), _) => Ok(saved),
            (Err(e), Some(copy)) => {
                tracing::error!(error = %e, backend = primary.backend_name(), "snapshot_save_failed_using_local");
                Ok(self.local.put(copy).await)
            }
            (Err(e), None) => Err(e),
        }
    }
}
