use crate::application::ports::link_store::{LinkStore, StoreError};
use crate::domain::links::link::Snapshot;

pub struct ListLinks<'a, S: LinkStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: LinkStore + ?Sized> ListLinks<'a, S> {
    pub async fn execute(&self) -> Result<Snapshot, StoreError> {
        self.store.list().await
    }
}
