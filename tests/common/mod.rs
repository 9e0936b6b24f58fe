#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use cloud_share::application::ports::http_transport::HttpTransport;
use cloud_share::bootstrap::app_context::{AppContext, AppServices};
use cloud_share::bootstrap::config::Config;
use cloud_share::bootstrap::storage::build_link_store;
use cloud_share::infrastructure::transport::reqwest_transport::ReqwestTransport;
use cloud_share::presentation::http::router;

/// Build the application router from a set of environment variables,
/// wired the same way `main.rs` wires it.
pub fn app_with(vars: &[(&str, &str)]) -> Router {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let cfg = Config::from_map(&map).unwrap();
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
    let link_store = build_link_store(&cfg, transport.clone());
    router(AppContext::new(cfg, AppServices::new(link_store, transport)))
}

/// Router backed by the local store in `temp`; never touches the network.
pub fn local_app(temp: &TempDir) -> Router {
    let dir = temp.path().to_string_lossy().into_owned();
    app_with(&[("STORAGE_BACKEND", "local"), ("LOCAL_STORE_DIR", &dir)])
}

pub async fn send_raw(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

/// Send a JSON request to `uri` and return status plus parsed body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    let resp = send_raw(app, req).await;
    let status = resp.status();
    (status, body_json(resp).await)
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
