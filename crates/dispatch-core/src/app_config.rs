use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Upstream endpoint URLs. Every field is a full URL so that tests can point
/// each provider at a distinct mock path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub bc_geocoder_url: String,
    pub nominatim_url: String,
    pub directions_url: String,
    pub places_url: String,
    pub places_nearby_url: String,
    pub fires_url: String,
    /// Base of the city feed; the provider appends `/{code}_e.xml`.
    pub weather_base_url: String,
    pub first_nations_url: String,
    pub first_nations_alt_url: String,
    pub road_events_url: String,
    pub evacuation_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            bc_geocoder_url: "https://geocoder.api.gov.bc.ca/addresses.json".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            directions_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            places_url: "https://places.googleapis.com/v1/places:searchText".to_string(),
            places_nearby_url: "https://places.googleapis.com/v1/places:searchNearby".to_string(),
            fires_url: "https://openmaps.gov.bc.ca/geo/pub/wfs".to_string(),
            weather_base_url: "https://weather.gc.ca/rss/city".to_string(),
            first_nations_url:
                "https://geo.aadnc-aandc.gc.ca/cippn-fnpim/WmsLayer/executeWfsQuery".to_string(),
            first_nations_alt_url: "https://geo.aadnc-aandc.gc.ca/cippn-fnpim/ows".to_string(),
            road_events_url: "https://api.open511.gov.bc.ca/events".to_string(),
            evacuation_url: "https://services6.arcgis.com/ubm4tcTYICKBpist/arcgis/rest/services/Evacuation_Orders_and_Alerts/FeatureServer/0/query".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub user_agent: String,
    pub provider_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub google_maps_api_key: Option<String>,
    pub endpoints: Endpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            user_agent: "dispatch-brief/0.1 (wildfire-dispatch)".to_string(),
            provider_timeout_secs: 5,
            http_timeout_secs: 10,
            provider_max_retries: 1,
            retry_backoff_base_ms: 250,
            google_maps_api_key: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("provider_max_retries", &self.provider_max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("endpoints", &self.endpoints)
            .finish()
    }
}
