use crate::application::ports::link_store::{LinkStore, StoreError};
use crate::domain::links::link::LinkId;

pub struct DeleteLink<'a, S: LinkStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: LinkStore + ?Sized> DeleteLink<'a, S> {
    pub async fn execute(&self, id: Option<LinkId>) -> Result<bool, StoreError> {
        let id = super::require_id(id)?;
        let deleted = self.store.delete(&id).await?;
        tracing::info!(link_id = %id, "link_deleted");
        Ok(deleted)
    }
}
