//! Upstream data provider clients for dispatch briefings.
//!
//! Every client returns `Result<_, ProviderError>`; the orchestrator folds
//! those into [`dispatch_core::ProviderResult`] through [`gateway::guard`].

pub mod community_ops;
pub mod directions;
pub mod employers;
pub mod error;
pub mod evacuation;
pub mod fires;
pub mod first_nations;
pub mod gateway;
mod geojson;
pub mod geocoder;
pub mod http;
pub mod places;
pub mod poi;
mod retry;
pub mod road_events;
pub mod water_sources;
pub mod weather;

pub use community_ops::community_ops;
pub use directions::{Directions, DirectionsClient};
pub use employers::employers_near;
pub use error::{GeocodeError, ProviderError};
pub use evacuation::EvacuationClient;
pub use fires::FiresClient;
pub use first_nations::FirstNationsClient;
pub use gateway::guard;
pub use geocoder::Geocoder;
pub use http::HttpFetcher;
pub use places::{Place, PlacesClient};
pub use poi::PoiSearch;
pub use road_events::{RoadEventQuery, RoadEventsClient};
pub use water_sources::water_sources_near;
pub use weather::WeatherClient;

use std::time::Duration;

use dispatch_core::{AppConfig, ReferenceTables};

/// Every provider client, sharing one [`HttpFetcher`] connection pool.
#[derive(Debug, Clone)]
pub struct Providers {
    pub tables: &'static ReferenceTables,
    pub geocoder: Geocoder,
    pub directions: DirectionsClient,
    pub places: PlacesClient,
    pub fires: FiresClient,
    pub weather: WeatherClient,
    pub first_nations: FirstNationsClient,
    pub road_events: RoadEventsClient,
    pub evacuation: EvacuationClient,
    pub poi: PoiSearch,
}

impl Providers {
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be built or a
    /// configured endpoint is malformed.
    pub fn from_config(
        config: &AppConfig,
        tables: &'static ReferenceTables,
    ) -> Result<Self, ProviderError> {
        let http = HttpFetcher::new(config)?;
        let places = PlacesClient::new(http.clone(), config)?;
        Ok(Self {
            tables,
            geocoder: Geocoder::new(http.clone(), config, tables)?,
            directions: DirectionsClient::new(http.clone(), config)?,
            fires: FiresClient::new(http.clone(), config)?,
            weather: WeatherClient::new(http.clone(), config, tables)?,
            first_nations: FirstNationsClient::new(http.clone(), config, tables)?,
            road_events: RoadEventsClient::new(http.clone(), config)?,
            evacuation: EvacuationClient::new(http, config)?,
            poi: PoiSearch::new(places.clone(), tables)
                .with_live_budget(Duration::from_secs(config.provider_timeout_secs) * 3 / 4),
            places,
        })
    }
}
