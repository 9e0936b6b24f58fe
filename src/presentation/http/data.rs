use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::dto::links::{LinkRow, RowSnapshot};
use crate::application::use_cases::links::create_link::CreateLink;
use crate::application::use_cases::links::delete_link::DeleteLink;
use crate::application::use_cases::links::increment_download::IncrementDownload;
use crate::application::use_cases::links::list_links::ListLinks;
use crate::application::use_cases::links::update_link::UpdateLink;
use crate::bootstrap::app_context::AppContext;
use crate::domain::links::link::{LinkId, LinkPatch, NewLink};
use crate::presentation::http::error::ApiError;

/// Request envelope for every mutating method. `data` carries the link fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub link_id: Option<LinkId>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkListResponse {
    #[schema(value_type = Vec<Object>)]
    pub links: Vec<LinkRow>,
    pub last_update: Option<DateTime<Utc>>,
    pub version: String,
}

impl From<RowSnapshot> for LinkListResponse {
    fn from(s: RowSnapshot) -> Self {
        LinkListResponse {
            links: s.links,
            last_update: s.last_update,
            version: s.version,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LinkResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: LinkRow,
}

/// `data` is null when the backend accepted the update but echoed no row.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateResponse {
    pub success: bool,
    #[schema(value_type = Option<Object>)]
    pub data: Option<LinkRow>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncrementResponse {
    pub success: bool,
    pub download_count: u64,
    #[schema(value_type = Option<Object>)]
    pub data: Option<LinkRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

/// An empty body reads as `{}`; anything else must be valid JSON.
fn parse_body(body: &Bytes) -> Result<DataRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DataRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))
}

fn fields<T: DeserializeOwned>(data: Option<Value>) -> Result<Option<T>, ApiError> {
    match data {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("invalid link data: {e}"))),
    }
}

#[utoipa::path(get, path = "/api/data", tag = "Links",
    responses(
        (status = 200, body = LinkListResponse),
        (status = 500, body = ErrorBody)
    ))]
pub async fn list_links(State(ctx): State<AppContext>) -> Result<Json<LinkListResponse>, ApiError> {
    let store = ctx.link_store();
    let uc = ListLinks {
        store: store.as_ref(),
    };
    let snapshot = uc.execute().await?;
    Ok(Json(RowSnapshot::from(snapshot).into()))
}

/// `POST` creates a link, or bumps its download counter when `action` is `increment`.
#[utoipa::path(post, path = "/api/data", tag = "Links",
    request_body = DataRequest,
    responses(
        (status = 200, description = "Link created; the increment action answers with IncrementResponse", body = LinkResponse),
        (status = 400, body = ErrorBody),
        (status = 500, body = ErrorBody)
    ))]
pub async fn create_or_increment(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req = parse_body(&body)?;
    let store = ctx.link_store();

    if req.action.as_deref() == Some("increment") {
        let uc = IncrementDownload {
            store: store.as_ref(),
        };
        let outcome = uc.execute(req.link_id).await?;
        let resp = IncrementResponse {
            success: true,
            download_count: outcome.download_count,
            data: outcome.link.map(Into::into),
        };
        return Ok(Json(resp).into_response());
    }

    let uc = CreateLink {
        store: store.as_ref(),
    };
    let link = uc.execute(fields::<NewLink>(req.data)?).await?;
    Ok(Json(LinkResponse {
        success: true,
        data: link.into(),
    })
    .into_response())
}

#[utoipa::path(patch, path = "/api/data", tag = "Links",
    request_body = DataRequest,
    responses(
        (status = 200, body = UpdateResponse),
        (status = 400, body = ErrorBody),
        (status = 404, description = "Snapshot backends only", body = ErrorBody),
        (status = 500, body = ErrorBody)
    ))]
pub async fn update_link(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<Json<UpdateResponse>, ApiError> {
    let req = parse_body(&body)?;
    let store = ctx.link_store();
    let uc = UpdateLink {
        store: store.as_ref(),
    };
    let link = uc
        .execute(req.link_id, fields::<LinkPatch>(req.data)?)
        .await?;
    Ok(Json(UpdateResponse {
        success: true,
        data: link.map(Into::into),
    }))
}

#[utoipa::path(delete, path = "/api/data", tag = "Links",
    request_body = DataRequest,
    responses(
        (status = 200, body = DeleteResponse),
        (status = 400, body = ErrorBody),
        (status = 500, body = ErrorBody)
    ))]
pub async fn delete_link(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<Json<DeleteResponse>, ApiError> {
    let req = parse_body(&body)?;
    let store = ctx.link_store();
    let uc = DeleteLink {
        store: store.as_ref(),
    };
    uc.execute(req.link_id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/data",
            get(list_links)
                .post(create_or_increment)
                .patch(update_link)
                .delete(delete_link)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(ctx)
}
