use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::task::JoinHandle;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cloud_share::application::ports::http_transport::HttpTransport;
use cloud_share::bootstrap::app_context::{AppContext, AppServices};
use cloud_share::bootstrap::config::Config;
use cloud_share::bootstrap::storage::build_link_store;
use cloud_share::infrastructure::transport::reqwest_transport::ReqwestTransport;
use cloud_share::presentation::http::{ApiDoc, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cloud_share=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting cloud-share backend");

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
    let link_store = build_link_store(&cfg, transport.clone());
    info!(
        backend = link_store.backend_name(),
        on_failure = cfg.on_failure.as_str(),
        "storage_backend_selected"
    );

    let ctx = AppContext::new(cfg.clone(), AppServices::new(link_store, transport));
    let app = router(ctx)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()));

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "shutdown_signal_failed");
    }
    info!("shutting_down");
}
