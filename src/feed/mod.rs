//! Departure feed collaborator.
//!
//! [`FeedSource`] is the seam between the aggregation pipeline and the
//! upstream departures API; [`VbbClient`] implements it for the VBB REST API.

mod models;
mod vbb;

pub use models::{Departure, DepartureBoard, Line, Remark, RemarkKind, parse_trip};
pub use vbb::VbbClient;

use async_trait::async_trait;

use crate::fetch::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("feed document is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Departures at the configured stop, in the source language.
    async fn fetch_departures(&self) -> Result<DepartureBoard, FeedError>;

    /// The trip `trip_id`, with remarks in `language`.
    async fn fetch_trip(&self, trip_id: &str, language: &str) -> Result<Departure, FeedError>;
}
