//! Route estimate data model.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// One turn-by-turn leg with its own duration and end point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub duration_seconds: u64,
    pub end: Coordinate,
    /// Raw navigation text; may contain HTML markup.
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvernightPoint {
    pub coordinate: Coordinate,
    pub location_name: String,
    pub suggested_stop: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Directions,
    /// Great-circle estimate; no segment data.
    Estimated,
}

/// Drive estimate between two points.
///
/// `adjusted_duration_seconds >= duration_seconds` always holds, with equality
/// exactly when there is no ferry crossing. `overnight_point` is only present
/// when `needs_overnight` is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub adjusted_duration_seconds: u64,
    pub ferry_crossing: bool,
    pub ferry_note: Option<String>,
    pub needs_overnight: bool,
    pub overnight_point: Option<OvernightPoint>,
    pub source: RouteSource,
    pub origin_label: Option<String>,
    pub destination_label: Option<String>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    /// Overview path when the directions provider supplied one.
    pub path: Vec<Coordinate>,
    pub distance_text: String,
    pub duration_text: String,
    pub adjusted_duration_text: String,
}
