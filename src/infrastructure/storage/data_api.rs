use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::application::dto::links::{LinkRow, RowSnapshot};
use crate::application::ports::http_transport::{HttpRequest, HttpTransport};
use crate::application::ports::link_store::{
    IncrementOutcome, LinkStore, StoreError, ensure_id, ensure_new_link,
};
use crate::domain::links::link::{Link, LinkId, LinkPatch, NewLink, Snapshot};
use crate::infrastructure::storage::envelope::error_from_envelope;

#[derive(Debug, Deserialize)]
struct Mutation {
    #[serde(default)]
    data: Option<LinkRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Increment {
    #[serde(default)]
    download_count: u64,
    #[serde(default)]
    data: Option<LinkRow>,
}

/// Client for a remote `/api/data` handler. Rows come back snake_case and
/// are translated into `Link` here.
pub struct DataApiLinkStore {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl DataApiLinkStore {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            endpoint: format!("{}/api/data", base_url.trim_end_matches('/')),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        context: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<T, StoreError> {
        let mut req = HttpRequest::new(method, self.endpoint.as_str());
        if let Some(body) = body {
            req = req.json(&body).map_err(|e| StoreError::decode(context, e))?;
        }
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

fn returned_link(context: &str, row: Option<LinkRow>) -> Result<Link, StoreError> {
    row.map(Into::into).ok_or_else(|| {
        StoreError::backend(context, 200, "response carried no link")
    })
}

#[async_trait]
impl LinkStore for DataApiLinkStore {
    fn backend_name(&self) -> &'static str {
        "api"
    }

    async fn list(&self) -> Result<Snapshot, StoreError> {
        let rows: RowSnapshot = self
            .call("failed to fetch links", Method::GET, None)
            .await?;
        Ok(rows.into())
    }

    async fn create(&self, new: NewLink) -> Result<Link, StoreError> {
        const CTX: &str = "failed to create link";
        ensure_new_link(&new)?;
        let out: Mutation = self
            .call(CTX, Method::POST, Some(json!({ "data": new })))
            .await?;
        returned_link(CTX, out.data)
    }

    async fn update(&self, id: &LinkId, patch: LinkPatch) -> Result<Option<Link>, StoreError> {
        const CTX: &str = "failed to update link";
        ensure_id(id)?;
        let out: Mutation = self
            .call(
                CTX,
                Method::PATCH,
                Some(json!({ "linkId": id, "data": patch })),
            )
            .await?;
        Ok(out.data.map(Into::into))
    }

    async fn delete(&self, id: &LinkId) -> Result<bool, StoreError> {
        ensure_id(id)?;
        let _: Value = self
            .call(
                "failed to delete link",
                Method::DELETE,
                Some(json!({ "linkId": id })),
            )
            .await?;
        Ok(true)
    }

    async fn increment_download(&self, id: &LinkId) -> Result<IncrementOutcome, StoreError> {
        ensure_id(id)?;
        let out: Increment = self
            .call(
                "failed to update download count",
                Method::POST,
                Some(json!({ "action": "increment", "linkId": id })),
            )
            .await?;
        Ok(IncrementOutcome {
            download_count: out.download_count,
            link: out.data.map(Into::into),
        })
    }
}
