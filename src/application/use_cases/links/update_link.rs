use crate::application::ports::link_store::{LinkStore, StoreError};
use crate::domain::links::link::{Link, LinkId, LinkPatch};

pub struct UpdateLink<'a, S: LinkStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: LinkStore + ?Sized> UpdateLink<'a, S> {
    pub async fn execute(
        &self,
        id: Option<LinkId>,
        patch: Option<LinkPatch>,
    ) -> Result<Option<Link>, StoreError> {
        let id = super::require_id(id)?;
        self.store.update(&id, patch.unwrap_or_default()).await
    }
}
