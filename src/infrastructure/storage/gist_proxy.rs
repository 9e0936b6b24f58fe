use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use serde_json::json;

use crate::application::ports::http_transport::{HttpRequest, HttpTransport};
use crate::application::ports::link_store::StoreError;
use crate::application::ports::snapshot_store::SnapshotStore;
use crate::domain::links::link::Snapshot;
use crate::infrastructure::storage::envelope::error_from_envelope;

pub const PROXY_PATH: &str = "api/github-proxy";

/// Forwards snapshot reads and writes to a `/api/github-proxy` endpoint that
/// holds the GitHub token, so the caller never sees it.
pub struct GistProxySnapshotStore {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    gist_id: String,
}

impl GistProxySnapshotStore {
    pub fn new(transport: Arc<dyn HttpTransport>, proxy_url: &str, gist_id: &str) -> Self {
        let endpoint = if proxy_url.ends_with('/') {
            format!("{proxy_url}{PROXY_PATH}")
        } else {
            format!("{proxy_url}/{PROXY_PATH}")
        };
        Self {
            transport,
            endpoint,
            gist_id: gist_id.trim().to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, context: &str, body: serde_json::Value) -> Result<Snapshot, StoreError> {
        if self.gist_id.is_empty() {
            return Err(StoreError::Configuration("GIST_ID is not configured".into()));
        }
        let req = HttpRequest::new(Method::POST, self.endpoint.as_str())
            .json(&body)
            .map_err(|e| StoreError::decode(context, e))?;
        let resp = self
            .transport
            .send(req)
            .await
            .map_err(|e| StoreError::transport(context, e))?;
        if !resp.is_success() {
            return Err(error_from_envelope(context, &resp));
        }
        resp.json().map_err(|e| StoreError::decode(context, e))
    }
}

#[async_trait]
impl SnapshotStore for GistProxySnapshotStore {
    fn backend_name(&self) -> &'static str {
        "gist-proxy"
    }

    async fn load(&self) -> Result<Snapshot, StoreError> {
        self.call(
            "failed to fetch data",
            json!({ "action": "get", "gistId": self.gist_id }),
        )
        .await
    }

    async fn save(&self, snapshot: Snapshot) -> Result<Snapshot, StoreError> {
        self.call(
            "failed to save data",
            json!({ "action": "update", "gistId": self.gist_id, "data": snapshot }),
        )
        .await
    }
}
