use crate::application::ports::http_transport::HttpResponse;
use crate::application::ports::link_store::StoreError;

/// Rebuilds a `StoreError` from a failed `{error: "..."}` response of one of
/// our own endpoints (`/api/data`, `/api/github-proxy`).
pub(crate) fn error_from_envelope(context: &str, resp: &HttpResponse) -> StoreError {
    let message = serde_json::from_str::<serde_json::Value>(&resp.body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| context.to_string());
    match resp.status {
        400 => StoreError::Validation(message),
        401 | 403 => StoreError::Auth {
            status: resp.status,
            message,
        },
        404 => StoreError::NotFound(message),
        status => StoreError::backend(context, status, message),
    }
}
