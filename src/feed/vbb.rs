use async_trait::async_trait;
use tracing::info;

use super::models::{Departure, DepartureBoard, parse_trip};
use super::{FeedError, FeedSource};
use crate::config::FeedSettings;
use crate::fetch::{HttpClient, fetch_bytes};

/// [`FeedSource`] backed by the VBB REST API (`v6.vbb.transport.rest`).
pub struct VbbClient<C> {
    http: C,
    settings: FeedSettings,
}

impl<C: HttpClient> VbbClient<C> {
    pub fn new(http: C, settings: FeedSettings) -> Self {
        Self { http, settings }
    }

    fn departures_url(&self) -> String {
        // Only suburban trains; the stop is also served by regional lines and buses.
        format!(
            "{}/stops/{}/departures?subway=false&tram=false&bus=false&ferry=false&regional=false&express=false&duration={}&language={}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.stop_id,
            self.settings.duration_minutes,
            self.settings.language,
        )
    }

    fn trip_url(&self, trip_id: &str, language: &str) -> String {
        format!(
            "{}/trips/{}?stopovers=false&remarks=true&language={}",
            self.settings.base_url.trim_end_matches('/'),
            urlencoding::encode(trip_id),
            language,
        )
    }
}

#[async_trait]
impl<C: HttpClient> FeedSource for VbbClient<C> {
    #[tracing::instrument(skip(self), fields(stop_id = %self.settings.stop_id))]
    async fn fetch_departures(&self) -> Result<DepartureBoard, FeedError> {
        info!("Requesting departures from VBB API");
        let bytes = fetch_bytes(&self.http, &self.departures_url()).await?;
        DepartureBoard::from_slice(&bytes)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_trip(&self, trip_id: &str, language: &str) -> Result<Departure, FeedError> {
        let bytes = fetch_bytes(&self.http, &self.trip_url(trip_id, language)).await?;
        parse_trip(&bytes)
    }
}
