use crate::application::ports::link_store::{LinkStore, StoreError};
use crate::domain::links::link::{Link, NewLink};

pub struct CreateLink<'a, S: LinkStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: LinkStore + ?Sized> CreateLink<'a, S> {
    /// `None` is the "no data in the request" case and is rejected like a
    /// missing name or url.
    pub async fn execute(&self, fields: Option<NewLink>) -> Result<Link, StoreError> {
        let fields = fields.unwrap_or_default();
        let link = self.store.create(fields).await?;
        tracing::info!(link_id = ?link.id, backend = self.store.backend_name(), "link_created");
        Ok(link)
    }
}
