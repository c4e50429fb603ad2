//! Active road events from the DriveBC Open511 API.

use std::cmp::Ordering;

use reqwest::Url;
use serde::Deserialize;

use dispatch_core::{AppConfig, BoundingBox, Coordinate, RoadEvent};

use crate::error::ProviderError;
use crate::geojson::{lenient, Geometry};
use crate::http::{endpoint, HttpFetcher};

/// Padding around a route corridor, in degrees (about 50 km).
pub const CORRIDOR_PADDING_DEG: f64 = 0.5;
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Area to search: a circle around one point, or the corridor between two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoadEventQuery {
    Point { center: Coordinate, radius_km: f64 },
    Corridor {
        origin: Coordinate,
        destination: Coordinate,
    },
}

impl RoadEventQuery {
    /// Corridor when an origin is known, otherwise the default radius.
    #[must_use]
    pub fn for_briefing(destination: Coordinate, origin: Option<Coordinate>) -> Self {
        match origin {
            Some(origin) => Self::Corridor {
                origin,
                destination,
            },
            None => Self::Point {
                center: destination,
                radius_km: DEFAULT_RADIUS_KM,
            },
        }
    }

    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        match *self {
            Self::Point { center, radius_km } => BoundingBox::around(center, radius_km),
            Self::Corridor {
                origin,
                destination,
            } => BoundingBox::corridor(origin, destination, CORRIDOR_PADDING_DEG),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default, deserialize_with = "lenient")]
    id: String,
    #[serde(default, deserialize_with = "lenient")]
    event_type: String,
    #[serde(default, deserialize_with = "lenient")]
    severity: String,
    #[serde(default, deserialize_with = "lenient")]
    headline: String,
    #[serde(default, deserialize_with = "lenient")]
    description: String,
    #[serde(default, deserialize_with = "lenient")]
    roads: Vec<RawRoad>,
    #[serde(default, deserialize_with = "lenient")]
    geography: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient")]
    schedule: Option<RawSchedule>,
    #[serde(default, deserialize_with = "lenient")]
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawRoad {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSchedule {
    #[serde(default, deserialize_with = "lenient")]
    intervals: Vec<RawInterval>,
}

/// Open511 writes intervals as `"start/end"`; some feeds use an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInterval {
    Text(String),
    Object {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
}

impl RawInterval {
    fn bounds(self) -> (Option<String>, Option<String>) {
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        match self {
            RawInterval::Text(text) => match text.split_once('/') {
                Some((start, end)) => (non_empty(start), non_empty(end)),
                None => (non_empty(&text), None),
            },
            RawInterval::Object { start, end } => (start, end),
        }
    }
}

fn severity_label(raw: &str) -> String {
    match raw {
        "MINOR" => "Minor".to_string(),
        "MODERATE" => "Moderate".to_string(),
        "MAJOR" => "Major".to_string(),
        "UNKNOWN" | "" => "Unknown".to_string(),
        other => other.to_string(),
    }
}

fn event_type_label(raw: &str) -> String {
    match raw {
        "CONSTRUCTION" => "Construction".to_string(),
        "INCIDENT" => "Incident".to_string(),
        "SPECIAL_EVENT" => "Special Event".to_string(),
        "WEATHER_CONDITION" => "Weather".to_string(),
        "ROAD_CONDITION" => "Road Condition".to_string(),
        other => other.to_string(),
    }
}

fn severity_rank(label: &str) -> u8 {
    match label {
        "Major" => 0,
        "Moderate" => 1,
        "Minor" => 2,
        "Unknown" => 3,
        _ => 4,
    }
}

/// Major, Moderate, Minor, Unknown; then road name, then id.
pub fn compare_events(a: &RoadEvent, b: &RoadEvent) -> Ordering {
    severity_rank(&a.severity)
        .cmp(&severity_rank(&b.severity))
        .then_with(|| a.road_name.cmp(&b.road_name))
        .then_with(|| a.id.cmp(&b.id))
}

impl From<RawEvent> for RoadEvent {
    fn from(raw: RawEvent) -> Self {
        let road = raw.roads.into_iter().next();
        let (road_name, direction) = match road {
            Some(r) => (r.name, r.direction),
            None => (None, None),
        };
        let (start_time, end_time) = raw
            .schedule
            .and_then(|s| s.intervals.into_iter().next())
            .map_or((None, None), RawInterval::bounds);
        RoadEvent {
            id: raw.id,
            event_type: event_type_label(&raw.event_type),
            severity: severity_label(&raw.severity),
            headline: raw.headline,
            description: raw.description,
            road_name: road_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown Road".to_string()),
            direction,
            coordinate: raw.geography.and_then(|g| g.first_point()),
            start_time,
            end_time,
            status: raw.status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoadEventsClient {
    http: HttpFetcher,
    url: Url,
}

impl RoadEventsClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if the configured endpoint is malformed.
    pub fn new(http: HttpFetcher, config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http,
            url: endpoint(&config.endpoints.road_events_url)?,
        })
    }

    /// Active events inside the query area, sorted by [`compare_events`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure or a malformed body.
    pub async fn events(&self, query: RoadEventQuery) -> Result<Vec<RoadEvent>, ProviderError> {
        let response: EventsResponse = self
            .http
            .get_json(
                &self.url,
                &[
                    ("status", "ACTIVE".to_string()),
                    ("format", "json".to_string()),
                    ("bbox", query.bbox().to_lng_lat_string()),
                    ("limit", "100".to_string()),
                ],
                "open511 events",
            )
            .await?;
        let mut events: Vec<RoadEvent> = response.events.into_iter().map(RoadEvent::from).collect();
        events.sort_by(compare_events);
        tracing::debug!(count = events.len(), "road events fetched");
        Ok(events)
    }
}
