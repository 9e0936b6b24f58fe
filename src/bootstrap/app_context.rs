use std::sync::Arc;

use crate::application::ports::http_transport::HttpTransport;
use crate::application::ports::link_store::LinkStore;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    link_store: Arc<dyn LinkStore>,
    transport: Arc<dyn HttpTransport>,
}

impl AppServices {
    pub fn new(link_store: Arc<dyn LinkStore>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            link_store,
            transport,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn link_store(&self) -> Arc<dyn LinkStore> {
        self.services.link_store.clone()
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.services.transport.clone()
    }
}
