//! Route Computer: driving directions with a great-circle fallback, a ferry
//! buffer for island crossings, and overnight-stop placement.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use dispatch_core::reference::island_region;
use dispatch_core::{
    format_distance, format_duration, haversine_km, Coordinate, Domain, OvernightPoint,
    ProviderResult, RouteEstimate, RouteSegment, RouteSource,
};
use dispatch_providers::{guard, Directions, DirectionsClient};

/// Drives longer than this (strictly) need an overnight stop.
pub const OVERNIGHT_THRESHOLD_SECS: u64 = 10 * 3600;
/// Ferry wait plus crossing.
pub const FERRY_BUFFER_SECS: u64 = 2 * 3600;
pub const FERRY_NOTE: &str = "Includes ~2 hours for BC Ferries (wait + crossing)";

/// Road distance over great-circle distance.
const TERRAIN_FACTOR: f64 = 1.4;
const FALLBACK_SPEED_KMH: f64 = 80.0;
const SUGGESTED_STOP: &str = "After approximately 10 hours of driving";

static INLINE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:b|wbr)\s*/?>").expect("valid regex"));
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:toward|onto|via)\s+([^<]+)").expect("valid regex")
});

/// Distance, duration and steps of one drive, before ferry and overnight
/// policy are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveLeg {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub path: Vec<Coordinate>,
    pub segments: Vec<RouteSegment>,
    pub source: RouteSource,
}

impl From<Directions> for DriveLeg {
    fn from(d: Directions) -> Self {
        Self {
            distance_meters: d.distance_meters,
            duration_seconds: d.duration_seconds,
            start_address: d.start_address,
            end_address: d.end_address,
            path: d.path,
            segments: d.segments,
            source: RouteSource::Directions,
        }
    }
}

/// Estimate from straight-line distance: inflated by the terrain factor and
/// driven at a fixed highway speed. Has no segment data.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn great_circle_leg(origin: Coordinate, destination: Coordinate) -> DriveLeg {
    let road_km = haversine_km(origin, destination) * TERRAIN_FACTOR;
    DriveLeg {
        distance_meters: (road_km * 1000.0).round() as u64,
        duration_seconds: (road_km / FALLBACK_SPEED_KMH * 3600.0).round() as u64,
        start_address: None,
        end_address: None,
        path: Vec::new(),
        segments: Vec::new(),
        source: RouteSource::Estimated,
    }
}

/// True when exactly one endpoint lies in a ferry-served island region.
#[must_use]
pub fn crosses_ferry(origin: Coordinate, destination: Coordinate) -> bool {
    island_region(origin).is_some() != island_region(destination).is_some()
}

/// Place name from a navigation instruction: the text after "toward",
/// "onto" or "via", else the end coordinate to two decimals.
#[must_use]
pub fn extract_location_name(instruction: &str, end: Coordinate) -> String {
    let plain = INLINE_TAG_RE.replace_all(instruction, "");
    LOCATION_RE
        .captures(&plain)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| end.short_label())
}

/// End point of the first segment at which cumulative driving time reaches
/// `threshold_secs`. The point is not interpolated within the segment.
#[must_use]
pub fn find_overnight_point(segments: &[RouteSegment], threshold_secs: u64) -> Option<OvernightPoint> {
    let mut elapsed = 0_u64;
    segments.iter().find_map(|segment| {
        elapsed += segment.duration_seconds;
        (elapsed >= threshold_secs).then(|| OvernightPoint {
            coordinate: segment.end,
            location_name: extract_location_name(&segment.instruction, segment.end),
            suggested_stop: SUGGESTED_STOP.to_string(),
        })
    })
}

/// Apply ferry and overnight policy to a drive.
#[must_use]
pub fn assemble_estimate(
    origin: Coordinate,
    destination: Coordinate,
    leg: DriveLeg,
    origin_label: Option<&str>,
    destination_label: Option<&str>,
) -> RouteEstimate {
    let ferry_crossing = crosses_ferry(origin, destination);
    let adjusted_duration_seconds = if ferry_crossing {
        leg.duration_seconds + FERRY_BUFFER_SECS
    } else {
        leg.duration_seconds
    };
    let needs_overnight = adjusted_duration_seconds > OVERNIGHT_THRESHOLD_SECS;
    let overnight_point = if needs_overnight {
        find_overnight_point(&leg.segments, OVERNIGHT_THRESHOLD_SECS)
    } else {
        None
    };

    RouteEstimate {
        distance_meters: leg.distance_meters,
        duration_seconds: leg.duration_seconds,
        adjusted_duration_seconds,
        ferry_crossing,
        ferry_note: ferry_crossing.then(|| FERRY_NOTE.to_string()),
        needs_overnight,
        overnight_point,
        source: leg.source,
        origin_label: origin_label.map(str::to_string),
        destination_label: destination_label.map(str::to_string),
        start_address: leg.start_address,
        end_address: leg.end_address,
        path: leg.path,
        distance_text: format_distance(leg.distance_meters),
        duration_text: format_duration(leg.duration_seconds),
        adjusted_duration_text: format_duration(adjusted_duration_seconds),
    }
}

#[derive(Debug, Clone)]
pub struct RouteComputer {
    directions: DirectionsClient,
    timeout: Duration,
}

impl RouteComputer {
    #[must_use]
    pub fn new(directions: DirectionsClient, timeout: Duration) -> Self {
        Self {
            directions,
            timeout,
        }
    }

    /// Never fails: when the directions provider is unavailable the
    /// great-circle estimate is used instead.
    pub async fn compute(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        origin_label: Option<&str>,
        destination_label: Option<&str>,
    ) -> RouteEstimate {
        let leg = match guard(
            Domain::Route,
            self.timeout,
            self.directions.route(origin, destination),
        )
        .await
        {
            ProviderResult::Fetched(directions) => DriveLeg::from(directions),
            ProviderResult::Unavailable { reason } => {
                tracing::info!(%reason, "route estimated from great-circle distance");
                great_circle_leg(origin, destination)
            }
        };
        let estimate =
            assemble_estimate(origin, destination, leg, origin_label, destination_label);
        tracing::debug!(
            source = ?estimate.source,
            adjusted_s = estimate.adjusted_duration_seconds,
            ferry = estimate.ferry_crossing,
            overnight = estimate.needs_overnight,
            "route computed"
        );
        estimate
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
