pub mod aggregate;
pub mod classify;
pub mod config;
pub mod feed;
pub mod fetch;
pub mod poller;
pub mod sanitize;
pub mod snapshot;
pub mod status;
pub mod store;
pub mod translate;
