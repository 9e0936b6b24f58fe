use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use http::Method;
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::http_transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::application::ports::link_store::StoreError;
use crate::application::ports::snapshot_store::SnapshotStore;
use crate::domain::links::link::Snapshot;

pub const GIST_FILENAME: &str = "cloud-share-data.json";
pub const GIST_DESCRIPTION: &str = "Cloud share link data";
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("cloud-share/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GithubAuthScheme {
    #[default]
    Bearer,
    /// Legacy `Authorization: token …` form.
    Token,
}

impl GithubAuthScheme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bearer" => Some(Self::Bearer),
            "token" => Some(Self::Token),
            _ => None,
        }
    }

    fn header_value(self, token: &str) -> String {
        match self {
            Self::Bearer => format!("Bearer {token}"),
            Self::Token => format!("token {token}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Gist {
    #[serde(default)]
    files: HashMap<String, Option<GistFile>>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
}

/// The whole snapshot lives in one file of one Gist, read and written
/// directly against the GitHub API.
pub struct GistSnapshotStore {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    gist_id: String,
    token: String,
    scheme: GithubAuthScheme,
}

impl GistSnapshotStore {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_base: &str,
        gist_id: &str,
        token: &str,
        scheme: GithubAuthScheme,
    ) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            gist_id: gist_id.to_string(),
            token: token.to_string(),
            scheme,
        }
    }

    fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.api_base, self.gist_id)
    }

    fn request(&self, method: Method) -> HttpRequest {
        HttpRequest::new(method, self.gist_url())
            .header("Authorization", self.scheme.header_value(&self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
    }

    /// `Ok(None)` when the Gist does not exist.
    async fn fetch(&self, context: &str) -> Result<Option<Gist>, StoreError> {
        let resp = self
            .transport
            .send(self.request(Method::GET))
            .await
            .map_err(|e| StoreError::transport(context, e))?;
        if resp.status == 404 {
            return Ok(None);
        }
        if !resp.is_success() {
            return Err(github_error(context, &resp));
        }
        resp.json().map(Some).map_err(|e| StoreError::decode(context, e))
    }
}

/// Maps a failed GitHub response, naming the fix for credential problems.
pub(crate) fn github_error(context: &str, resp: &HttpResponse) -> StoreError {
    match resp.status {
        401 => StoreError::Auth {
            status: 401,
            message: "GitHub token is invalid or expired, generate a new one".into(),
        },
        403 => StoreError::Auth {
            status: 403,
            message: "GitHub token lacks the `gist` scope or access to this Gist".into(),
        },
        status => StoreError::backend(context, status, upstream_message(&resp.body)),
    }
}

/// GitHub error bodies are `{"message": "..."}`; anything else is passed through.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl SnapshotStore for GistSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "gist"
    }

    async fn load(&self) -> Result<Snapshot, StoreError> {
        const CTX: &str = "failed to read gist";
        let Some(gist) = self.fetch(CTX).await? else {
            tracing::debug!(gist_id = %self.gist_id, "gist_missing_returning_empty");
            return Ok(Snapshot::empty());
        };
        let content = gist
            .files
            .get(GIST_FILENAME)
            .and_then(|f| f.as_ref())
            .and_then(|f| f.content.as_deref());
        match content {
            Some(text) => serde_json::from_str(text).map_err(|e| StoreError::decode(CTX, e)),
            None => Ok(Snapshot::empty()),
        }
    }

    async fn save(&self, snapshot: Snapshot) -> Result<Snapshot, StoreError> {
        const CTX: &str = "failed to save gist";
        if self.fetch(CTX).await?.is_none() {
            return Err(StoreError::NotFound(
                "Gist does not exist, check GIST_ID".into(),
            ));
        }

        let stamped = Snapshot {
            last_update: Some(Utc::now()),
            ..snapshot
        };
        let content =
            serde_json::to_string_pretty(&stamped).map_err(|e| StoreError::decode(CTX, e))?;
        let body = json!({
            "description": GIST_DESCRIPTION,
            "public": false,
            "files": { GIST_FILENAME: { "content": content } },
        });
        let req = self
            .request(Method::PATCH)
            .json(&body)
            .map_err(|e| StoreError::decode(CTX, e))?;
        let resp = self
            .transport
            .send(req)
            .await
            .map_err(|e| StoreError::transport(CTX, e))?;
        if !resp.is_success() {
            return Err(github_error(CTX, &resp));
        }
        tracing::info!(gist_id = %self.gist_id, links = stamped.links.len(), "gist_saved");
        Ok(stamped)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::domain::links::link::{Link, LinkId, NewLink};
    use crate::infrastructure::transport::scripted::ScriptedTransport;

    fn store(transport: &Arc<ScriptedTransport>, scheme: GithubAuthScheme) -> GistSnapshotStore {
        GistSnapshotStore::new(transport.clone(), GITHUB_API_BASE, "g123", "ghp_secret", scheme)
    }

    fn gist_with(content: &str) -> Value {
        json!({ "id": "g123", "files": { GIST_FILENAME: { "content": content } } })
    }

    fn sample_snapshot() -> Snapshot {
        let now = "2024-06-01T12:00:00Z".parse().unwrap();
        let mut snap = Snapshot::empty();
        snap.links.push(Link::from_new(
            Some(LinkId::from("a1")),
            NewLink::new("ISO images", "https://pan.example/s/iso"),
            now,
        ));
        snap
    }

    #[tokio::test]
    async fn missing_gist_loads_as_empty() {
        let transport = Arc::new(ScriptedTransport::new().reply(404, r#"{"message":"Not Found"}"#));
        let snap = store(&transport, GithubAuthScheme::Bearer).load().await.unwrap();
        assert!(snap.links.is_empty());
        assert_eq!(snap.last_update, None);
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let transport = Arc::new(
            ScriptedTransport::new().reply_json(200, json!({ "id": "g123", "files": {} })),
        );
        let snap = store(&transport, GithubAuthScheme::Bearer).load().await.unwrap();
        assert_eq!(snap, Snapshot::empty());
    }

    #[tokio::test]
    async fn load_sends_auth_scheme_and_accept_headers() {
        let transport = Arc::new(ScriptedTransport::new().reply_json(200, json!({ "files": {} })));
        store(&transport, GithubAuthScheme::Token).load().await.unwrap();
        let call = &transport.calls()[0];
        assert_eq!(call.url, "https://api.github.com/gists/g123");
        assert_eq!(call.header_value("authorization"), Some("token ghp_secret"));
        assert_eq!(call.header_value("accept"), Some("application/vnd.github.v3+json"));
        assert!(call.header_value("user-agent").is_some());
    }

    #[tokio::test]
    async fn credential_failures_name_the_remedy() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(401, r#"{"message":"Bad credentials"}"#)
                .reply(403, r#"{"message":"Forbidden"}"#),
        );
        let store = store(&transport, GithubAuthScheme::Bearer);

        match store.load().await.unwrap_err() {
            StoreError::Auth { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid or expired"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        match store.load().await.unwrap_err() {
            StoreError::Auth { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("scope"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_failures_surface_upstream_message() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(502, r#"{"message":"Server Error"}"#)
                .reply(500, "plain failure"),
        );
        let store = store(&transport, GithubAuthScheme::Bearer);
        assert_eq!(
            store.load().await.unwrap_err().to_string(),
            "failed to read gist: 502 - Server Error"
        );
        assert_eq!(
            store.load().await.unwrap_err().to_string(),
            "failed to read gist: 500 - plain failure"
        );
    }

    #[tokio::test]
    async fn save_to_missing_gist_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new().reply(404, "{}"));
        let err = store(&transport, GithubAuthScheme::Bearer)
            .save(sample_snapshot())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let original = sample_snapshot();
        let writer = Arc::new(
            ScriptedTransport::new()
                .reply_json(200, json!({ "files": {} }))
                .reply_json(200, json!({ "id": "g123" })),
        );
        let saved = store(&writer, GithubAuthScheme::Bearer)
            .save(original.clone())
            .await
            .unwrap();
        assert!(saved.last_update.is_some());

        let patch = &writer.calls()[1];
        assert_eq!(patch.method, Method::PATCH);
        let body: Value = serde_json::from_str(patch.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["public"], false);
        let content = body["files"][GIST_FILENAME]["content"].as_str().unwrap();

        let reader = Arc::new(ScriptedTransport::new().reply_json(200, gist_with(content)));
        let loaded = store(&reader, GithubAuthScheme::Bearer).load().await.unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(
            Snapshot {
                last_update: None,
                ..loaded
            },
            original
        );
    }
}
