//! Shared data model, geo math, formatting, reference tables, and
//! configuration for the dispatch briefing workspace.

pub mod app_config;
pub mod briefing;
pub mod config;
pub mod format;
pub mod geo;
pub mod geocode;
pub mod provider;
pub mod reference;
pub mod route;

pub use app_config::{AppConfig, Endpoints, Environment};
pub use briefing::{
    BriefingRecord, CommunityOps, CommunityOpsProfile, Confidence, Contact, EvacuationAlert,
    EvacuationKind, Fire, FirstNation, GeocodedLocation, Lodging, MajorEmployer, PoiCategory,
    PoiEntry, PointsOfInterest, RegionalContact, RoadEvent, TravelInfo, WaterSource, Weather,
    WeatherCurrent, WeatherPeriod,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use format::{format_distance, format_duration};
pub use geo::{decode_polyline, haversine_km, round_km, BoundingBox, Coordinate};
pub use geocode::{Disambiguation, GeocodeCandidate, GeocodeResult, GeocodedPlace, GeocodeSource};
pub use provider::{Domain, DomainStatus, ProviderResult};
pub use reference::ReferenceTables;
pub use route::{OvernightPoint, RouteEstimate, RouteSegment, RouteSource};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid coordinate ({lat}, {lng}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("invalid coordinate text '{0}': expected '<lat>,<lng>'")]
    InvalidCoordinateText(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to parse embedded reference table {table}: {source}")]
    ReferenceTable {
        table: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
}
