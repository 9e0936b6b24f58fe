use async_trait::async_trait;

use crate::domain::links::link::{Link, LinkId, LinkPatch, NewLink, Snapshot};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Auth { status: u16, message: String },
    #[error("{context}: {status} - {body}")]
    Backend {
        context: String,
        status: u16,
        body: String,
    },
    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{context}: malformed response ({source})")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn backend(context: &str, status: u16, body: impl Into<String>) -> Self {
        StoreError::Backend {
            context: context.to_string(),
            status,
            body: body.into(),
        }
    }

    pub fn transport(context: &str, source: anyhow::Error) -> Self {
        StoreError::Transport {
            context: context.to_string(),
            source,
        }
    }

    pub fn decode(context: &str, source: serde_json::Error) -> Self {
        StoreError::Decode {
            context: context.to_string(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result of a download-counter bump. `link` carries the refreshed record
/// when the backend returned one.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementOutcome {
    pub download_count: u64,
    pub link: Option<Link>,
}

impl IncrementOutcome {
    pub fn missed() -> Self {
        Self {
            download_count: 0,
            link: None,
        }
    }
}

/// The five logical link operations every backend exposes.
#[async_trait]
pub trait LinkStore: Send + Sync {
    fn backend_name(&self) -> &'static str;
    async fn list(&self) -> Result<Snapshot, StoreError>;
    async fn create(&self, new: NewLink) -> Result<Link, StoreError>;
    /// `Ok(None)` when the backend accepted the update but echoed no row.
    async fn update(&self, id: &LinkId, patch: LinkPatch) -> Result<Option<Link>, StoreError>;
    async fn delete(&self, id: &LinkId) -> Result<bool, StoreError>;
    async fn increment_download(&self, id: &LinkId) -> Result<IncrementOutcome, StoreError>;
}

pub fn ensure_new_link(new: &NewLink) -> Result<(), StoreError> {
    if new.has_required_fields() {
        Ok(())
    } else {
        Err(StoreError::Validation(
            "link name and url are required".into(),
        ))
    }
}

pub fn ensure_id(id: &LinkId) -> Result<(), StoreError> {
    if id.is_blank() {
        Err(StoreError::Validation("link id is required".into()))
    } else {
        Ok(())
    }
}
