//! Aggregation Orchestrator: geocode the destination (and origin), fan out to
//! every data domain at once, and hand the results to the builder.

use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use dispatch_core::{
    AppConfig, Coordinate, Disambiguation, Domain, GeocodeResult, GeocodedPlace, PoiCategory,
    ProviderResult, ReferenceTables, TravelInfo,
};
use dispatch_providers::{
    community_ops, employers_near, guard, water_sources_near, GeocodeError, ProviderError,
    Providers, RoadEventQuery,
};

use crate::builder::{self, BriefingParts};
use crate::route::RouteComputer;
use crate::BriefingError;

const FIRST_NATIONS_RADIUS_KM: f64 = 50.0;
const EMPLOYER_RADIUS_KM: f64 = 50.0;
const WATER_SOURCE_RADIUS_KM: f64 = 50.0;
const EVACUATION_RADIUS_KM: f64 = 100.0;
const OVERNIGHT_LODGING_RADIUS_KM: f64 = 50.0;
const OVERNIGHT_LODGING_MAX: usize = 3;

/// Where the drive starts: a place name to geocode, or a known point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OriginInput {
    Place(String),
    Point {
        lat: f64,
        lng: f64,
        #[serde(default)]
        label: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingRequest {
    pub community: String,
    #[serde(default)]
    pub fire_number: Option<String>,
    #[serde(default)]
    pub origin: Option<OriginInput>,
}

/// Which request field a disambiguation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguousField {
    Destination,
    Origin,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BriefingOutcome {
    Ready(Box<dispatch_core::BriefingRecord>),
    /// The caller must choose a candidate and re-issue the request.
    NeedsDisambiguation {
        field: AmbiguousField,
        disambiguation: Disambiguation,
    },
}

/// A resolved origin point with its display label.
struct Origin {
    coordinate: Coordinate,
    label: String,
}

enum OriginResolution {
    Absent,
    Resolved(Origin),
    Ambiguous(Disambiguation),
}

#[derive(Debug, Clone)]
pub struct BriefingEngine {
    providers: Providers,
    route: RouteComputer,
    timeout: Duration,
}

impl BriefingEngine {
    #[must_use]
    pub fn new(providers: Providers, provider_timeout: Duration) -> Self {
        let route = RouteComputer::new(providers.directions.clone(), provider_timeout);
        Self {
            providers,
            route,
            timeout: provider_timeout,
        }
    }

    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be built or a
    /// configured endpoint is malformed.
    pub fn from_config(
        config: &AppConfig,
        tables: &'static ReferenceTables,
    ) -> Result<Self, ProviderError> {
        Ok(Self::new(
            Providers::from_config(config, tables)?,
            Duration::from_secs(config.provider_timeout_secs),
        ))
    }

    #[must_use]
    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    #[must_use]
    pub fn route_computer(&self) -> &RouteComputer {
        &self.route
    }

    /// Build one briefing. Only a destination that cannot be geocoded fails
    /// the request; every other failure leaves its section empty.
    ///
    /// # Errors
    ///
    /// - [`BriefingError::InvalidRequest`] for a blank community or an
    ///   out-of-range origin point.
    /// - [`BriefingError::LocationNotFound`] when the destination does not
    ///   geocode.
    pub async fn build_briefing(
        &self,
        request: &BriefingRequest,
    ) -> Result<BriefingOutcome, BriefingError> {
        let started = Instant::now();
        let community = request.community.trim();
        if community.is_empty() {
            return Err(BriefingError::InvalidRequest(
                "community must not be empty".to_string(),
            ));
        }

        let (destination, origin) = tokio::join!(
            self.providers.geocoder.resolve(community),
            self.resolve_origin(request.origin.as_ref()),
        );

        let destination = match destination {
            Ok(GeocodeResult::Resolved(place)) => place,
            Ok(GeocodeResult::Ambiguous(disambiguation)) => {
                return Ok(BriefingOutcome::NeedsDisambiguation {
                    field: AmbiguousField::Destination,
                    disambiguation,
                });
            }
            Err(GeocodeError::EmptyQuery) => {
                return Err(BriefingError::InvalidRequest(
                    "community must not be empty".to_string(),
                ));
            }
            Err(GeocodeError::NotFound(name)) => {
                return Err(BriefingError::LocationNotFound(name));
            }
        };

        let origin = match origin? {
            OriginResolution::Absent => None,
            OriginResolution::Resolved(origin) => Some(origin),
            OriginResolution::Ambiguous(disambiguation) => {
                return Ok(BriefingOutcome::NeedsDisambiguation {
                    field: AmbiguousField::Origin,
                    disambiguation,
                });
            }
        };

        let parts = self
            .fan_out(community, request.fire_number.clone(), destination, origin)
            .await;
        let record = builder::build(parts, self.providers.tables);

        let degraded: Vec<&str> = record
            .coverage
            .iter()
            .filter(|s| !s.ok)
            .map(|s| s.domain.as_str())
            .collect();
        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            community,
            domains = record.coverage.len(),
            degraded = ?degraded,
            elapsed_ms,
            "briefing assembled"
        );
        Ok(BriefingOutcome::Ready(Box::new(record)))
    }

    async fn resolve_origin(
        &self,
        origin: Option<&OriginInput>,
    ) -> Result<OriginResolution, BriefingError> {
        match origin {
            None => Ok(OriginResolution::Absent),
            Some(OriginInput::Point { lat, lng, label }) => {
                let coordinate = Coordinate::new(*lat, *lng)
                    .map_err(|e| BriefingError::InvalidRequest(e.to_string()))?;
                Ok(OriginResolution::Resolved(Origin {
                    coordinate,
                    label: label.clone().unwrap_or_else(|| coordinate.short_label()),
                }))
            }
            Some(OriginInput::Place(text)) if text.trim().is_empty() => {
                Ok(OriginResolution::Absent)
            }
            Some(OriginInput::Place(text)) => match self.providers.geocoder.resolve(text).await {
                Ok(GeocodeResult::Resolved(place)) => Ok(OriginResolution::Resolved(Origin {
                    coordinate: place.coordinate,
                    label: text.trim().to_string(),
                })),
                Ok(GeocodeResult::Ambiguous(d)) => Ok(OriginResolution::Ambiguous(d)),
                Err(e) => {
                    tracing::warn!(origin = %text, error = %e, "origin not geocoded; route omitted");
                    Ok(OriginResolution::Absent)
                }
            },
        }
    }

    /// Issue every domain call concurrently and wait for all of them.
    async fn fan_out(
        &self,
        community: &str,
        fire_number: Option<String>,
        destination: GeocodedPlace,
        origin: Option<Origin>,
    ) -> BriefingParts {
        let p = &self.providers;
        let t = self.timeout;
        let center = destination.coordinate;
        let road_query = RoadEventQuery::for_briefing(center, origin.as_ref().map(|o| o.coordinate));

        let travel = async {
            match &origin {
                Some(origin) => Some(self.travel(origin, center, community).await),
                None => None,
            }
        };

        let pois = join_all(PoiCategory::ALL.into_iter().map(|category| async move {
            let result = guard(
                category.domain(),
                t,
                p.poi.search(community, category, Some(center)),
            )
            .await;
            (category, result)
        }));

        let (
            travel,
            fires,
            weather,
            first_nations,
            employers,
            water_sources,
            points_of_interest,
            road_events,
            ops,
            evacuation_alerts,
        ) = tokio::join!(
            travel,
            guard(Domain::Fires, t, p.fires.active_fires(center)),
            guard(Domain::Weather, t, p.weather.forecast(community, Some(center))),
            guard(
                Domain::FirstNations,
                t,
                p.first_nations.near(center, FIRST_NATIONS_RADIUS_KM)
            ),
            guard(
                Domain::Employers,
                t,
                employers_near(p.tables, &p.places, center, EMPLOYER_RADIUS_KM)
            ),
            guard(
                Domain::WaterSources,
                t,
                water_sources_near(p.tables, &p.places, center, WATER_SOURCE_RADIUS_KM)
            ),
            pois,
            guard(Domain::RoadEvents, t, p.road_events.events(road_query)),
            guard(Domain::CommunityOps, t, async {
                Ok::<_, ProviderError>(community_ops(p.tables, community))
            }),
            guard(
                Domain::EvacuationAlerts,
                t,
                p.evacuation.near(center, EVACUATION_RADIUS_KM)
            ),
        );

        BriefingParts {
            community: community.to_string(),
            fire_number,
            generated_at: Utc::now(),
            destination,
            travel,
            fires,
            weather,
            first_nations,
            employers,
            water_sources,
            points_of_interest,
            road_events,
            community_ops: ops,
            evacuation_alerts,
        }
    }

    /// Route estimate plus lodging near the overnight stop. Both share one
    /// provider timeout; lodging only gets what the route left over. Lodging
    /// failures only leave the lodging list empty.
    async fn travel(
        &self,
        origin: &Origin,
        destination: Coordinate,
        destination_label: &str,
    ) -> ProviderResult<TravelInfo> {
        let deadline = Instant::now() + self.timeout;
        let route = self
            .route
            .compute(
                origin.coordinate,
                destination,
                Some(&origin.label),
                Some(destination_label),
            )
            .await;

        let overnight_lodging = match &route.overnight_point {
            Some(point) => guard(
                Domain::Route,
                deadline.saturating_duration_since(Instant::now()),
                self.providers
                    .places
                    .nearby_lodging(point.coordinate, OVERNIGHT_LODGING_RADIUS_KM),
            )
            .await
            .into_value()
            .map(|mut lodging| {
                lodging.truncate(OVERNIGHT_LODGING_MAX);
                lodging
            })
            .unwrap_or_default(),
            None => Vec::new(),
        };

        ProviderResult::Fetched(TravelInfo {
            route,
            overnight_lodging,
        })
    }
}
