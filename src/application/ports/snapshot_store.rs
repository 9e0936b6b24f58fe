use async_trait::async_trait;

use crate::application::ports::link_store::StoreError;
use crate::domain::links::link::Snapshot;

/// Whole-document persistence: every mutation rewrites the full snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    fn backend_name(&self) -> &'static str;
    async fn load(&self) -> Result<Snapshot, StoreError>;
    /// Persists `snapshot` with a fresh `lastUpdate` and returns what was written.
    async fn save(&self, snapshot: Snapshot) -> Result<Snapshot, StoreError>;
}

/// What a snapshot-backed store does when its remote backend is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Surface the error to the caller.
    #[default]
    Fail,
    /// Log it and serve or persist through the local store instead.
    FallbackLocal,
}

impl FailurePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fail" => Some(Self::Fail),
            "fallback-local" | "fallback_local" | "local" => Some(Self::FallbackLocal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::FallbackLocal => "fallback-local",
        }
    }
}
