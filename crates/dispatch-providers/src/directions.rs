//! Google Directions client: driving distance, duration and turn-by-turn steps.

use reqwest::Url;
use serde::Deserialize;

use dispatch_core::{decode_polyline, AppConfig, Coordinate, RouteSegment};

use crate::error::ProviderError;
use crate::http::{endpoint, HttpFetcher};

/// One driving route as reported by the directions service.
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub path: Vec<Coordinate>,
    pub segments: Vec<RouteSegment>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    #[serde(default)]
    legs: Vec<RawLeg>,
    #[serde(default)]
    overview_polyline: Option<RawPolyline>,
}

#[derive(Debug, Deserialize)]
struct RawPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    distance: RawValue,
    duration: RawValue,
    #[serde(default)]
    start_address: Option<String>,
    #[serde(default)]
    end_address: Option<String>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    duration: RawValue,
    end_location: RawLatLng,
    #[serde(default)]
    html_instructions: String,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    http: HttpFetcher,
    url: Url,
    api_key: Option<String>,
}

impl DirectionsClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if the configured endpoint is malformed.
    pub fn new(http: HttpFetcher, config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http,
            url: endpoint(&config.endpoints.directions_url)?,
            api_key: config.google_maps_api_key.clone(),
        })
    }

    /// Driving route between two points, metric units, Canadian region bias.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::MissingApiKey`] when no key is configured.
    /// - [`ProviderError::UpstreamStatus`] when the service answers with a
    ///   status other than `OK` or with no route legs.
    /// - [`ProviderError::Http`] / [`ProviderError::Deserialize`] on transport
    ///   or body failures.
    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Directions, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("directions"))?;
        let response: DirectionsResponse = self
            .http
            .get_json(
                &self.url,
                &[
                    ("origin", origin.to_string()),
                    ("destination", destination.to_string()),
                    ("mode", "driving".to_string()),
                    ("units", "metric".to_string()),
                    ("region", "ca".to_string()),
                    ("key", key.to_string()),
                ],
                "directions",
            )
            .await?;

        if response.status != "OK" {
            return Err(ProviderError::UpstreamStatus {
                service: "directions",
                status: response.status,
                message: response.error_message.unwrap_or_default(),
            });
        }

        let Some(route) = response.routes.into_iter().next() else {
            return Err(no_route());
        };
        let path = route
            .overview_polyline
            .map(|p| decode_polyline(&p.points))
            .unwrap_or_default();
        let Some(leg) = route.legs.into_iter().next() else {
            return Err(no_route());
        };

        let segments = leg
            .steps
            .into_iter()
            .filter_map(|step| {
                Some(RouteSegment {
                    duration_seconds: step.duration.value,
                    end: Coordinate::new(step.end_location.lat, step.end_location.lng).ok()?,
                    instruction: step.html_instructions,
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            distance_m = leg.distance.value,
            duration_s = leg.duration.value,
            steps = segments.len(),
            "directions fetched"
        );

        Ok(Directions {
            distance_meters: leg.distance.value,
            duration_seconds: leg.duration.value,
            start_address: leg.start_address,
            end_address: leg.end_address,
            path,
            segments,
        })
    }
}

fn no_route() -> ProviderError {
    ProviderError::UpstreamStatus {
        service: "directions",
        status: "OK".to_string(),
        message: "response contained no route legs".to_string(),
    }
}
