use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use http::Method;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::dto::links::LinkRow;
use crate::application::ports::http_transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::application::ports::link_store::{
    IncrementOutcome, LinkStore, StoreError, ensure_id, ensure_new_link,
};
use crate::domain::links::link::{Link, LinkId, LinkPatch, NewLink, Snapshot};

/// One row per link in a PostgREST `links` table.
pub struct SupabaseLinkStore {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CounterRow {
    #[serde(default)]
    download_count: Option<u64>,
}

impl SupabaseLinkStore {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, api_key: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/links", self.base_url)
    }

    fn row_url(&self, id: &LinkId) -> String {
        format!(
            "{}?id=eq.{}",
            self.table_url(),
            urlencoding::encode(&id.to_string())
        )
    }

    fn request(&self, method: Method, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn write_request(
        &self,
        method: Method,
        url: String,
        body: &Value,
        context: &str,
    ) -> Result<HttpRequest, StoreError> {
        self.request(method, url)
            .header("Prefer", "return=representation")
            .json(body)
            .map_err(|e| StoreError::decode(context, e))
    }

    async fn send(&self, context: &str, req: HttpRequest) -> Result<HttpResponse, StoreError> {
        let resp = self
            .transport
            .send(req)
            .await
            .map_err(|e| StoreError::transport(context, e))?;
        if !resp.is_success() {
            return Err(StoreError::backend(context, resp.status, resp.body));
        }
        Ok(resp)
    }

    /// PostgREST echoes an array with `return=representation`, but an object or
    /// an empty body are tolerated too.
    fn first_row(context: &str, resp: &HttpResponse) -> Result<Option<LinkRow>, StoreError> {
        if resp.body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = resp.json().map_err(|e| StoreError::decode(context, e))?;
        let row = match value {
            Value::Array(items) => match items.into_iter().next() {
                Some(item) => item,
                None => return Ok(None),
            },
            obj @ Value::Object(_) => obj,
            _ => return Ok(None),
        };
        serde_json::from_value(row)
            .map(Some)
            .map_err(|e| StoreError::decode(context, e))
    }
}

#[async_trait]
impl LinkStore for SupabaseLinkStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn list(&self) -> Result<Snapshot, StoreError> {
        const CTX: &str = "failed to fetch links";
        let url = format!("{}?select=*&order=create_time.desc", self.table_url());
        let resp = self.send(CTX, self.request(Method::GET, url)).await?;
        let rows: Vec<LinkRow> = resp.json().map_err(|e| StoreError::decode(CTX, e))?;
        let last_update = rows.first().map(|r| r.update_time);
        Ok(Snapshot {
            links: rows.into_iter().map(Into::into).collect(),
            last_update,
            ..Snapshot::empty()
        })
    }

    async fn create(&self, new: NewLink) -> Result<Link, StoreError> {
        const CTX: &str = "failed to create link";
        ensure_new_link(&new)?;
        let link = Link::from_new(None, new, Utc::now());
        let body = serde_json::to_value(LinkRow::from(link.clone()))
            .map_err(|e| StoreError::decode(CTX, e))?;
        let req = self.write_request(Method::POST, self.table_url(), &body, CTX)?;
        let resp = self.send(CTX, req).await?;
        match Self::first_row(CTX, &resp)? {
            Some(row) => Ok(row.into()),
            None => {
                tracing::debug!("create_returned_no_representation");
                Ok(link)
            }
        }
    }

    async fn update(&self, id: &LinkId, patch: LinkPatch) -> Result<Option<Link>, StoreError> {
        const CTX: &str = "failed to update link";
        ensure_id(id)?;
        let mut body = serde_json::to_value(&patch).map_err(|e| StoreError::decode(CTX, e))?;
        body["update_time"] = json!(Utc::now());
        let req = self.write_request(Method::PATCH, self.row_url(id), &body, CTX)?;
        let resp = self.send(CTX, req).await?;
        // PostgREST answers an unmatched id filter with 200 and `[]`.
        let link = Self::first_row(CTX, &resp)?.map(Into::into);
        if link.is_none() {
            tracing::debug!(link_id = %id, "update_returned_no_rows");
        }
        Ok(link)
    }

    async fn delete(&self, id: &LinkId) -> Result<bool, StoreError> {
        ensure_id(id)?;
        self.send(
            "failed to delete link",
            self.request(Method::DELETE, self.row_url(id)),
        )
        .await?;
        Ok(true)
    }

    async fn increment_download(&self, id: &LinkId) -> Result<IncrementOutcome, StoreError> {
        const READ_CTX: &str = "failed to read download count";
        const WRITE_CTX: &str = "failed to update download count";
        ensure_id(id)?;

        let url = format!("{}&select=download_count", self.row_url(id));
        let resp = self.send(READ_CTX, self.request(Method::GET, url)).await?;
        let rows: Vec<CounterRow> = resp.json().map_err(|e| StoreError::decode(READ_CTX, e))?;
        let Some(row) = rows.first() else {
            return Err(StoreError::NotFound("link not found".into()));
        };

        // Read-modify-write: concurrent bumps on the same id can lose updates.
        let download_count = row.download_count.unwrap_or(0) + 1;
        let body = json!({
            "download_count": download_count,
            "update_time": Utc::now(),
        });
        let req = self.write_request(Method::PATCH, self.row_url(id), &body, WRITE_CTX)?;
        let resp = self.send(WRITE_CTX, req).await?;
        let link = Self::first_row(WRITE_CTX, &resp)?.map(Into::into);
        tracing::debug!(link_id = %id, download_count, "download_incremented");
        Ok(IncrementOutcome {
            download_count,
            link,
        })
    }
}
