use crate::application::ports::link_store::{IncrementOutcome, LinkStore, StoreError};
use crate::domain::links::link::LinkId;

pub struct IncrementDownload<'a, S: LinkStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: LinkStore + ?Sized> IncrementDownload<'a, S> {
    pub async fn execute(&self, id: Option<LinkId>) -> Result<IncrementOutcome, StoreError> {
        let id = super::require_id(id)?;
        self.store.increment_download(&id).await
    }
}
