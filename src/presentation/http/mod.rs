pub mod data;
pub mod error;
pub mod github_proxy;
pub mod health;

use axum::{
    Router,
    extract::MatchedPath,
    http::{Method, header},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::bootstrap::app_context::AppContext;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        data::list_links,
        data::create_or_increment,
        data::update_link,
        data::delete_link,
        github_proxy::github_proxy,
    ),
    components(schemas(
        health::HealthResp,
        data::DataRequest,
        data::LinkListResponse,
        data::LinkResponse,
        data::UpdateResponse,
        data::IncrementResponse,
        data::DeleteResponse,
        github_proxy::GistProxyRequest,
        error::ErrorBody,
    )),
    tags(
        (name = "Links", description = "Shared link storage"),
        (name = "Gist", description = "Server-side GitHub Gist proxy"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .nest("/api", data::routes(ctx.clone()))
        .nest("/api", github_proxy::routes(ctx.clone()))
        .nest("/api", health::routes(ctx))
        .layer(cors())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        )
}
