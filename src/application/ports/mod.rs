pub mod http_transport;
pub mod link_store;
pub mod snapshot_store;
