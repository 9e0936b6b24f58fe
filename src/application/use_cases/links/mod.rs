pub mod create_link;
pub mod delete_link;
pub mod increment_download;
pub mod list_links;
pub mod update_link;

use crate::application::ports::link_store::{StoreError, ensure_id};
use crate::domain::links::link::LinkId;

fn require_id(id: Option<LinkId>) -> Result<LinkId, StoreError> {
    let id = id.ok_or_else(|| StoreError::Validation("link id is required".into()))?;
    ensure_id(&id)?;
    Ok(id)
}
