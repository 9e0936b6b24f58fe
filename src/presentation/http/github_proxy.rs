use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::ports::link_store::StoreError;
use crate::application::ports::snapshot_store::SnapshotStore;
use crate::bootstrap::app_context::AppContext;
use crate::domain::links::link::Snapshot;
use crate::infrastructure::storage::gist::GistSnapshotStore;
use crate::presentation::http::error::ApiError;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GistProxyRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub gist_id: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Reads or replaces the snapshot in a Gist using the server's GitHub token.
#[utoipa::path(post, path = "/api/github-proxy", tag = "Gist",
    request_body = GistProxyRequest,
    responses(
        (status = 200, description = "Snapshot read or written"),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 500, body = ErrorBody)
    ))]
pub async fn github_proxy(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<Json<Snapshot>, ApiError> {
    let req: GistProxyRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GistProxyRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?
    };

    let github = &ctx.cfg.github;
    let token = github.token.as_deref().ok_or_else(|| {
        StoreError::Configuration("GITHUB_TOKEN is not configured on the server".into())
    })?;
    let gist_id = req
        .gist_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| github.default_gist_id.clone())
        .ok_or_else(|| ApiError::BadRequest("gistId is required".into()))?;

    let store = GistSnapshotStore::new(
        ctx.transport(),
        &github.api_base,
        &gist_id,
        token,
        github.scheme,
    );
    match req.action.as_deref() {
        Some("get") => Ok(Json(store.load().await.map_err(ApiError::Proxy)?)),
        Some("update") => {
            let data = req
                .data
                .ok_or_else(|| ApiError::BadRequest("data is required for update".into()))?;
            let snapshot: Snapshot = serde_json::from_value(data)
                .map_err(|e| ApiError::BadRequest(format!("invalid snapshot: {e}")))?;
            Ok(Json(store.save(snapshot).await.map_err(ApiError::Proxy)?))
        }
        other => Err(ApiError::BadRequest(format!(
            "unknown action `{}`",
            other.unwrap_or_default()
        ))),
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/github-proxy", post(github_proxy))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use http::Method;
    use serde_json::json;

    use super::*;
    use crate::bootstrap::app_context::AppServices;
    use crate::bootstrap::config::Config;
    use crate::domain::links::link::{Link, LinkId, NewLink};
    use crate::infrastructure::storage::gist::GIST_FILENAME;
    use crate::infrastructure::storage::unconfigured::UnconfiguredLinkStore;
    use crate::infrastructure::transport::scripted::ScriptedTransport;

    fn ctx(transport: Arc<ScriptedTransport>) -> AppContext {
        let map: HashMap<String, String> = [
            ("GITHUB_TOKEN", "ghp_server"),
            ("GIST_ID", "g-default"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let cfg = Config::from_map(&map).unwrap();
        let store = Arc::new(UnconfiguredLinkStore::new("unused"));
        AppContext::new(cfg, AppServices::new(store, transport))
    }

    fn request(body: serde_json::Value) -> Bytes {
        Bytes::from(body.to_string())
    }

    fn sample_snapshot() -> Snapshot {
        let mut snap = Snapshot::empty();
        snap.links.push(Link::from_new(
            Some(LinkId::from("a1")),
            NewLink::new("Drivers", "https://pan.example/s/drv"),
            "2024-06-01T12:00:00Z".parse().unwrap(),
        ));
        snap
    }

    #[tokio::test]
    async fn get_reads_default_gist_with_server_token() {
        let stored = sample_snapshot();
        let content = serde_json::to_string(&stored).unwrap();
        let transport = Arc::new(ScriptedTransport::new().reply_json(
            200,
            json!({ "files": { GIST_FILENAME: { "content": content } } }),
        ));

        let Json(snap) = github_proxy(State(ctx(transport.clone())), request(json!({ "action": "get" })))
            .await
            .unwrap();
        assert_eq!(snap, stored);

        let call = &transport.calls()[0];
        assert_eq!(call.url, "https://api.github.com/gists/g-default");
        assert_eq!(call.header_value("authorization"), Some("Bearer ghp_server"));
    }

    #[tokio::test]
    async fn request_gist_id_overrides_default() {
        let transport = Arc::new(ScriptedTransport::new().reply_json(200, json!({ "files": {} })));
        let Json(snap) = github_proxy(
            State(ctx(transport.clone())),
            request(json!({ "action": "get", "gistId": "g-other" })),
        )
        .await
        .unwrap();
        assert_eq!(snap, Snapshot::empty());
        assert_eq!(transport.calls()[0].url, "https://api.github.com/gists/g-other");
    }

    #[tokio::test]
    async fn update_writes_snapshot_and_returns_it_stamped() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(200, json!({ "files": {} }))
                .reply_json(200, json!({ "id": "g-default" })),
        );
        let data = serde_json::to_value(sample_snapshot()).unwrap();

        let Json(saved) = github_proxy(
            State(ctx(transport.clone())),
            request(json!({ "action": "update", "data": data })),
        )
        .await
        .unwrap();
        assert!(saved.last_update.is_some());
        assert_eq!(saved.links, sample_snapshot().links);

        let patch = &transport.calls()[1];
        assert_eq!(patch.method, Method::PATCH);
        let body: serde_json::Value = serde_json::from_str(patch.body.as_deref().unwrap()).unwrap();
        let written: Snapshot =
            serde_json::from_str(body["files"][GIST_FILENAME]["content"].as_str().unwrap()).unwrap();
        assert_eq!(written, saved);
    }

    #[tokio::test]
    async fn github_credential_failures_keep_their_status() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(401, r#"{"message":"Bad credentials"}"#)
                .reply(403, r#"{"message":"Forbidden"}"#),
        );
        let ctx = ctx(transport);

        let err = github_proxy(State(ctx.clone()), request(json!({ "action": "get" })))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = github_proxy(State(ctx), request(json!({ "action": "get" })))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_gist_on_update_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new().reply(404, r#"{"message":"Not Found"}"#));
        let err = github_proxy(
            State(ctx(transport)),
            request(json!({ "action": "update", "data": { "links": [] } })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
