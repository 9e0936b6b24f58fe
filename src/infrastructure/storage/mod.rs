pub mod data_api;
mod envelope;
pub mod fallback;
pub mod gist;
pub mod gist_proxy;
pub mod local;
pub mod snapshot_links;
pub mod supabase;
pub mod unconfigured;
