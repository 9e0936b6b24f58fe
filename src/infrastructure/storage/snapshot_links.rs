use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::application::ports::link_store::{
    IncrementOutcome, LinkStore, StoreError, ensure_id, ensure_new_link,
};
use crate::application::ports::snapshot_store::SnapshotStore;
use crate::domain::links::link::{Link, LinkId, LinkPatch, NewLink, Snapshot};

/// Link operations as read-modify-write cycles over a whole snapshot. Each
/// mutation rewrites the entire document.
pub struct SnapshotLinkStore {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotLinkStore {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }
}

fn not_found() -> StoreError {
    StoreError::NotFound("link not found".into())
}

#[async_trait]
impl LinkStore for SnapshotLinkStore {
    fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn list(&self) -> Result<Snapshot, StoreError> {
        self.store.load().await
    }

    async fn create(&self, new: NewLink) -> Result<Link, StoreError> {
        ensure_new_link(&new)?;
        let mut snapshot = self.store.load().await?;
        let id = LinkId::Text(Uuid::new_v4().to_string());
        let link = Link::from_new(Some(id), new, Utc::now());
        snapshot.links.insert(0, link.clone());
        self.store.save(snapshot).await?;
        Ok(link)
    }

    async fn update(&self, id: &LinkId, patch: LinkPatch) -> Result<Option<Link>, StoreError> {
        ensure_id(id)?;
        let mut snapshot = self.store.load().await?;
        let link = snapshot.find_mut(id).ok_or_else(not_found)?;
        link.apply(patch, Utc::now());
        let updated = link.clone();
        self.store.save(snapshot).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &LinkId) -> Result<bool, StoreError> {
        ensure_id(id)?;
        let mut snapshot = self.store.load().await?;
        snapshot.remove(id).ok_or_else(not_found)?;
        self.store.save(snapshot).await?;
        Ok(true)
    }

    async fn increment_download(&self, id: &LinkId) -> Result<IncrementOutcome, StoreError> {
        ensure_id(id)?;
        let mut snapshot = self.store.load().await?;
        let Some(link) = snapshot.find_mut(id) else {
            tracing::debug!(link_id = %id, "increment_missed_unknown_link");
            return Ok(IncrementOutcome::missed());
        };
        link.download_count += 1;
        link.update_time = Utc::now();
        let bumped = link.clone();
        self.store.save(snapshot).await?;
        Ok(IncrementOutcome {
            download_count: bumped.download_count,
            link: Some(bumped),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::infrastructure::transport::scripted::ScriptedTransport;
    use crate::infrastructure::storage::gist::{
        GIST_FILENAME, GITHUB_API_BASE, GistSnapshotStore, GithubAuthScheme,
    };
    use crate::infrastructure::storage::local::LocalSnapshotStore;

    fn local_store(temp: &TempDir) -> SnapshotLinkStore {
        SnapshotLinkStore::new(Arc::new(LocalSnapshotStore::new(temp.path())))
    }

    #[tokio::test]
    async fn create_prepends_link_with_fresh_counter() {
        let temp = TempDir::new().unwrap();
        let store = local_store(&temp);
        let first = store.create(NewLink::new("A", "https://a")).await.unwrap();
        let second = store.create(NewLink::new("B", "https://b")).await.unwrap();

        assert_eq!(second.download_count, 0);
        assert_eq!(second.create_time, second.update_time);
        assert_ne!(first.id, second.id);

        let snap = store.list().await.unwrap();
        let names: Vec<_> = snap.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        assert!(snap.last_update.is_some());
    }

    #[tokio::test]
    async fn create_validates_before_loading() {
        let temp = TempDir::new().unwrap();
        let store = local_store(&temp);
        let err = store.create(NewLink::new("A", "")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_are_not_found() {
        let temp = TempDir::new().unwrap();
        let store = local_store(&temp);
        store.create(NewLink::new("A", "https://a")).await.unwrap();

        let missing = LinkId::from("missing");
        assert!(store
            .update(&missing, LinkPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete(&missing).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_rewrites_fields_and_keeps_create_time() {
        let temp = TempDir::new().unwrap();
        let store = local_store(&temp);
        let link = store.create(NewLink::new("A", "https://a")).await.unwrap();
        let id = link.id.clone().unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let patch = LinkPatch {
            tags: Some(vec!["iso".into()]),
            code: Some("9x9x".into()),
            ..Default::default()
        };
        let updated = store.update(&id, patch).await.unwrap().unwrap();
        assert_eq!(updated.create_time, link.create_time);
        assert!(updated.update_time > link.update_time);
        assert_eq!(updated.code, "9x9x");

        assert!(store.delete(&id).await.unwrap());
        assert!(store.list().await.unwrap().links.is_empty());
    }

    #[tokio::test]
    async fn increment_bumps_by_one_and_refreshes_time() {
        let temp = TempDir::new().unwrap();
        let store = local_store(&temp);
        let link = store.create(NewLink::new("A", "https://a")).await.unwrap();
        let id = link.id.clone().unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let outcome = store.increment_download(&id).await.unwrap();
        assert_eq!(outcome.download_count, 1);
        let bumped = outcome.link.unwrap();
        assert!(bumped.update_time > link.update_time);
        assert_eq!(store.list().await.unwrap().links[0].download_count, 1);
    }

    #[tokio::test]
    async fn increment_of_unknown_id_resolves_to_zero_without_writing() {
        let snap = json!({
            "links": [{
                "id": "a1",
                "name": "A",
                "url": "https://a",
                "downloadCount": 2,
                "createTime": "2024-01-01T00:00:00Z",
                "updateTime": "2024-01-01T00:00:00Z"
            }],
            "lastUpdate": null,
            "version": "1.0.0"
        });
        let transport = Arc::new(ScriptedTransport::new().reply_json(
            200,
            json!({ "files": { GIST_FILENAME: { "content": snap.to_string() } } }),
        ));
        let store = SnapshotLinkStore::new(Arc::new(GistSnapshotStore::new(
            transport.clone(),
            GITHUB_API_BASE,
            "g1",
            "t",
            GithubAuthScheme::Bearer,
        )));

        let outcome = store.increment_download(&LinkId::from("zz")).await.unwrap();
        assert_eq!(outcome, IncrementOutcome::missed());
        assert_eq!(transport.call_count(), 1);
    }
}
