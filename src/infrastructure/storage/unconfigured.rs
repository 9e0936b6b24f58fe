use async_trait::async_trait;

use crate::application::ports::link_store::{IncrementOutcome, LinkStore, StoreError};
use crate::domain::links::link::{Link, LinkId, LinkPatch, NewLink, Snapshot};

/// Stands in when the selected backend lacks its settings: every call fails
/// with a configuration error and nothing touches the network.
pub struct UnconfiguredLinkStore {
    reason: String,
}

impl UnconfiguredLinkStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Configuration(self.reason.clone()))
    }
}

#[async_trait]
impl LinkStore for UnconfiguredLinkStore {
    fn backend_name(&self) -> &'static str {
        "unconfigured"
    }

    async fn list(&self) -> Result<Snapshot, StoreError> {
        self.fail()
    }

    async fn create(&self, _new: NewLink) -> Result<Link, StoreError> {
        self.fail()
    }

    async fn update(&self, _id: &LinkId, _patch: LinkPatch) -> Result<Option<Link>, StoreError> {
        self.fail()
    }

    async fn delete(&self, _id: &LinkId) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn increment_download(&self, _id: &LinkId) -> Result<IncrementOutcome, StoreError> {
        self.fail()
    }
}
