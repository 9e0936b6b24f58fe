use std::sync::Arc;

use crate::application::ports::http_transport::HttpTransport;
use crate::application::ports::link_store::LinkStore;
use crate::application::ports::snapshot_store::{FailurePolicy, SnapshotStore};
use crate::bootstrap::config::{Config, StorageBackend};
use crate::infrastructure::storage::data_api::DataApiLinkStore;
use crate::infrastructure::storage::fallback::FallbackSnapshotStore;
use crate::infrastructure::storage::gist::GistSnapshotStore;
use crate::infrastructure::storage::gist_proxy::GistProxySnapshotStore;
use crate::infrastructure::storage::local::LocalSnapshotStore;
use crate::infrastructure::storage::snapshot_links::SnapshotLinkStore;
use crate::infrastructure::storage::supabase::SupabaseLinkStore;
use crate::infrastructure::storage::unconfigured::UnconfiguredLinkStore;

/// Builds the one `LinkStore` every request is served from.
pub fn build_link_store(cfg: &Config, transport: Arc<dyn HttpTransport>) -> Arc<dyn LinkStore> {
    match &cfg.storage_backend {
        StorageBackend::Supabase { url, anon_key } => {
            warn_policy_ignored(cfg);
            Arc::new(SupabaseLinkStore::new(transport, url, anon_key))
        }
        StorageBackend::DataApi { base_url } => {
            warn_policy_ignored(cfg);
            Arc::new(DataApiLinkStore::new(transport, base_url))
        }
        StorageBackend::GistProxy { proxy_url, gist_id } => snapshot_links(
            cfg,
            Some(Arc::new(GistProxySnapshotStore::new(
                transport, proxy_url, gist_id,
            ))),
        ),
        StorageBackend::Gist { gist_id, token } => snapshot_links(
            cfg,
            Some(Arc::new(GistSnapshotStore::new(
                transport,
                &cfg.github.api_base,
                gist_id,
                token,
                cfg.github.scheme,
            ))),
        ),
        StorageBackend::Local => snapshot_links(cfg, None),
        StorageBackend::Unconfigured { reason } => {
            tracing::warn!(%reason, "storage_backend_unconfigured");
            Arc::new(UnconfiguredLinkStore::new(reason.clone()))
        }
    }
}

fn snapshot_links(cfg: &Config, primary: Option<Arc<dyn SnapshotStore>>) -> Arc<dyn LinkStore> {
    let local = LocalSnapshotStore::new(&cfg.local_store_dir);
    let store: Arc<dyn SnapshotStore> = match (primary, cfg.on_failure) {
        (Some(primary), FailurePolicy::Fail) => primary,
        (None, _) => Arc::new(local),
        (primary, policy) => Arc::new(FallbackSnapshotStore::new(primary, local, policy)),
    };
    Arc::new(SnapshotLinkStore::new(store))
}

fn warn_policy_ignored(cfg: &Config) {
    if cfg.on_failure == FailurePolicy::FallbackLocal {
        tracing::warn!(
            backend = cfg.storage_backend.name(),
            "failure_policy_applies_to_snapshot_backends_only"
        );
    }
}
