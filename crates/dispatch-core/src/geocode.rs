//! Geocoding outcomes.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Which lookup produced a geocode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeSource {
    Override,
    BcGeocoder,
    Nominatim,
}

/// A single resolved place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub formatted_address: String,
    /// 0–100; higher is a closer match.
    pub score: f64,
    pub source: GeocodeSource,
}

/// One choice in a [`Disambiguation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeCandidate {
    pub coordinate: Coordinate,
    pub display_name: String,
    pub formatted_address: String,
}

/// Two or more plausible places for the same text. The caller must pick one
/// and re-issue the request with a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Disambiguation {
    query: String,
    candidates: Vec<GeocodeCandidate>,
}

impl Disambiguation {
    /// Returns `None` unless there are at least two candidates.
    #[must_use]
    pub fn new(query: impl Into<String>, candidates: Vec<GeocodeCandidate>) -> Option<Self> {
        (candidates.len() >= 2).then(|| Self {
            query: query.into(),
            candidates,
        })
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn candidates(&self) -> &[GeocodeCandidate] {
        &self.candidates
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeocodeResult {
    Resolved(GeocodedPlace),
    Ambiguous(Disambiguation),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, lat: f64) -> GeocodeCandidate {
        GeocodeCandidate {
            coordinate: Coordinate::new(lat, -123.0).unwrap(),
            display_name: name.to_string(),
            formatted_address: name.to_string(),
        }
    }

    #[test]
    fn disambiguation_requires_two_candidates() {
        assert!(Disambiguation::new("Deep Cove", vec![]).is_none());
        assert!(Disambiguation::new("Deep Cove", vec![candidate("a", 49.0)]).is_none());
        let d = Disambiguation::new(
            "Deep Cove",
            vec![candidate("a", 49.0), candidate("b", 48.0)],
        )
        .unwrap();
        assert_eq!(d.candidates().len(), 2);
        assert_eq!(d.query(), "Deep Cove");
    }
}
