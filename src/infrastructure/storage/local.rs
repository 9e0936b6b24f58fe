use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::link_store::StoreError;
use crate::application::ports::snapshot_store::SnapshotStore;
use crate::domain::links::link::Snapshot;

pub const LOCAL_STORAGE_KEY: &str = "cloud_share_links";

/// Key/value persistence on the local filesystem under one fixed key. Never
/// fails observably: read problems yield an empty snapshot and write problems
/// are only logged.
#[derive(Debug, Clone)]
pub struct LocalSnapshotStore {
    dir: PathBuf,
}

impl LocalSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{LOCAL_STORAGE_KEY}.json"))
    }

    pub async fn get(&self) -> Snapshot {
        let path = self.path();
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Snapshot::empty(),
            Err(e) => {
                tracing::error!(error = ?e, path = %path.display(), "local_snapshot_read_failed");
                return Snapshot::empty();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::error!(error = ?e, path = %path.display(), "local_snapshot_corrupt");
            Snapshot::empty()
        })
    }

    pub async fn put(&self, snapshot: Snapshot) -> Snapshot {
        let stamped = Snapshot {
            last_update: Some(Utc::now()),
            ..snapshot
        };
        if let Err(e) = write_json(&self.dir, &self.path(), &stamped).await {
            tracing::error!(error = ?e, dir = %self.dir.display(), "local_snapshot_write_failed");
        }
        stamped
    }
}

async fn write_json(dir: &Path, path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let text = serde_json::to_string(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, text).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl SnapshotStore for LocalSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(self.get().await)
    }

    async fn save(&self, snapshot: Snapshot) -> Result<Snapshot, StoreError> {
        Ok(self.put(snapshot).await)
    }
}
