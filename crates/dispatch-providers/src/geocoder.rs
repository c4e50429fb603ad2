//! Free-text place name to coordinate, surfacing ambiguity.
//!
//! Lookup order: the static override table, the BC Address Geocoder, then
//! Nominatim. A source that errors or returns nothing usable falls through to
//! the next one; only when every source comes up empty does resolution fail.

use reqwest::Url;
use serde::Deserialize;

use dispatch_core::reference::GeocodeOverride;
use dispatch_core::{
    haversine_km, AppConfig, Coordinate, Disambiguation, GeocodeCandidate, GeocodeResult,
    GeocodeSource, GeocodedPlace, ReferenceTables,
};

use crate::error::{GeocodeError, ProviderError};
use crate::http::{endpoint, HttpFetcher};

/// BC results scoring below this are only used when Nominatim has nothing.
const MIN_USABLE_BC_SCORE: f64 = 50.0;
/// Hits within this many points of the best score count as equally plausible.
/// A distinct place scoring further below the best is never offered as a
/// candidate; the best hit resolves on its own.
const BC_SCORE_WINDOW: f64 = 5.0;
const NOMINATIM_SCORE_WINDOW: f64 = 10.0;
/// Hits closer than this are the same place reported twice.
const SAME_PLACE_KM: f64 = 2.0;

#[derive(Debug, Deserialize)]
struct BcResponse {
    #[serde(default)]
    features: Vec<BcFeature>,
}

#[derive(Debug, Deserialize)]
struct BcFeature {
    geometry: BcGeometry,
    properties: BcProperties,
}

#[derive(Debug, Deserialize)]
struct BcGeometry {
    /// `[lng, lat]`.
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BcProperties {
    #[serde(default)]
    full_address: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    importance: Option<f64>,
}

/// A candidate place from one source, scored 0-100.
#[derive(Debug, Clone, PartialEq)]
struct Hit {
    coordinate: Coordinate,
    address: String,
    score: f64,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: HttpFetcher,
    bc_url: Url,
    nominatim_url: Url,
    tables: &'static ReferenceTables,
}

impl Geocoder {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if a configured endpoint is malformed.
    pub fn new(
        http: HttpFetcher,
        config: &AppConfig,
        tables: &'static ReferenceTables,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http,
            bc_url: endpoint(&config.endpoints.bc_geocoder_url)?,
            nominatim_url: endpoint(&config.endpoints.nominatim_url)?,
            tables,
        })
    }

    /// Resolve `text` to one place, or to a [`Disambiguation`] when several
    /// distinct places are equally plausible.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::EmptyQuery`] for blank input.
    /// - [`GeocodeError::NotFound`] when no source yields a coordinate.
    pub async fn resolve(&self, text: &str) -> Result<GeocodeResult, GeocodeError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        if let Some(result) = self
            .tables
            .geocode_override(query)
            .and_then(|found| Self::from_override(query, found))
        {
            tracing::debug!(query, "geocode override hit");
            return Ok(result);
        }

        let bc_hits = match self.bc_lookup(query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(source = "bc_geocoder", query, error = %e, "geocoder failed");
                Vec::new()
            }
        };
        let bc_usable = bc_hits
            .first()
            .is_some_and(|h| h.score >= MIN_USABLE_BC_SCORE);
        if bc_usable {
            if let Some(result) =
                self.decide(query, bc_hits.clone(), BC_SCORE_WINDOW, GeocodeSource::BcGeocoder)
            {
                return Ok(result);
            }
        }

        match self.nominatim_lookup(query).await {
            Ok(hits) => {
                if let Some(result) =
                    self.decide(query, hits, NOMINATIM_SCORE_WINDOW, GeocodeSource::Nominatim)
                {
                    return Ok(result);
                }
                tracing::debug!(query, "nominatim returned no results");
            }
            Err(e) => {
                tracing::warn!(source = "nominatim", query, error = %e, "geocoder failed");
            }
        }

        // A weak BC match beats nothing at all.
        if let Some(result) = self.decide(query, bc_hits, BC_SCORE_WINDOW, GeocodeSource::BcGeocoder)
        {
            return Ok(result);
        }

        Err(GeocodeError::NotFound(query.to_string()))
    }

    fn from_override(query: &str, found: &GeocodeOverride) -> Option<GeocodeResult> {
        match found {
            GeocodeOverride::Place {
                coordinate,
                formatted_address,
            } => Some(GeocodeResult::Resolved(GeocodedPlace {
                coordinate: *coordinate,
                formatted_address: formatted_address.clone(),
                score: 100.0,
                source: GeocodeSource::Override,
            })),
            GeocodeOverride::Ambiguous(candidates) => {
                if let Some(d) = Disambiguation::new(query, candidates.clone()) {
                    return Some(GeocodeResult::Ambiguous(d));
                }
                candidates.first().map(|c| {
                    GeocodeResult::Resolved(GeocodedPlace {
                        coordinate: c.coordinate,
                        formatted_address: c.formatted_address.clone(),
                        score: 100.0,
                        source: GeocodeSource::Override,
                    })
                })
            }
        }
    }

    /// Pick the best hit, or build a disambiguation when more than one
    /// distinct place scores within `window` of the best. Places below the
    /// window are dropped rather than listed, so a second town at a much
    /// lower score resolves silently to the best one.
    fn decide(
        &self,
        query: &str,
        hits: Vec<Hit>,
        window: f64,
        source: GeocodeSource,
    ) -> Option<GeocodeResult> {
        let plausible = plausible_hits(hits, window);
        if plausible.len() >= 2 {
            let candidates = self.label_candidates(query, &plausible);
            if let Some(d) = Disambiguation::new(query, candidates) {
                tracing::info!(query, count = d.candidates().len(), "ambiguous place name");
                return Some(GeocodeResult::Ambiguous(d));
            }
        }
        plausible.into_iter().next().map(|hit| {
            GeocodeResult::Resolved(GeocodedPlace {
                coordinate: hit.coordinate,
                formatted_address: hit.address,
                score: hit.score,
                source,
            })
        })
    }

    /// `"<place> (<nearest locality>, <regional district>)"`, with the
    /// coordinate appended when two labels would otherwise collide.
    fn label_candidates(&self, query: &str, hits: &[Hit]) -> Vec<GeocodeCandidate> {
        let mut labels: Vec<String> = hits
            .iter()
            .map(|hit| {
                let place = hit
                    .address
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(query);
                match self.tables.nearest_locality(hit.coordinate) {
                    Some(locality) => {
                        let district = self
                            .tables
                            .district(&locality.district)
                            .map_or(locality.district.as_str(), |d| d.name.as_str());
                        format!("{place} ({}, {district})", locality.name)
                    }
                    None => place.to_string(),
                }
            })
            .collect();

        let snapshot = labels.clone();
        for (i, label) in labels.iter_mut().enumerate() {
            if snapshot.iter().filter(|l| *l == label).count() > 1 {
                *label = format!("{label} [{}]", hits[i].coordinate.short_label());
            }
        }

        hits.iter()
            .zip(labels)
            .map(|(hit, display_name)| GeocodeCandidate {
                coordinate: hit.coordinate,
                display_name,
                formatted_address: hit.address.clone(),
            })
            .collect()
    }

    async fn bc_lookup(&self, query: &str) -> Result<Vec<Hit>, ProviderError> {
        let address = if query.to_uppercase().contains("BC") {
            query.to_string()
        } else {
            format!("{query}, BC")
        };
        let response: BcResponse = self
            .http
            .get_json(
                &self.bc_url,
                &[
                    ("addressString", address),
                    ("maxResults", "5".to_string()),
                    ("outputSRS", "4326".to_string()),
                ],
                "bc geocoder addresses",
            )
            .await?;

        let mut hits: Vec<Hit> = response
            .features
            .into_iter()
            .filter_map(|f| {
                let [lng, lat] = f.geometry.coordinates[..] else {
                    return None;
                };
                Some(Hit {
                    coordinate: Coordinate::new(lat, lng).ok()?,
                    address: f.properties.full_address,
                    score: f.properties.score,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }

    async fn nominatim_lookup(&self, query: &str) -> Result<Vec<Hit>, ProviderError> {
        let response: Vec<NominatimHit> = self
            .http
            .get_json(
                &self.nominatim_url,
                &[
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("countrycodes", "ca".to_string()),
                    ("limit", "5".to_string()),
                ],
                "nominatim search",
            )
            .await?;

        let mut hits: Vec<Hit> = response
            .into_iter()
            .filter_map(|h| {
                let lat = h.lat.parse().ok()?;
                let lng = h.lon.parse().ok()?;
                Some(Hit {
                    coordinate: Coordinate::new(lat, lng).ok()?,
                    address: h.display_name,
                    score: h.importance.unwrap_or(0.0) * 100.0,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }
}

/// Hits scoring within `window` of the best, with near-duplicate locations
/// collapsed onto the higher-scoring one. Input must be sorted best first.
fn plausible_hits(hits: Vec<Hit>, window: f64) -> Vec<Hit> {
    let Some(top) = hits.first().map(|h| h.score) else {
        return Vec::new();
    };
    let mut kept: Vec<Hit> = Vec::new();
    for hit in hits {
        if hit.score < top - window {
            continue;
        }
        let duplicate = kept
            .iter()
            .any(|k| haversine_km(k.coordinate, hit.coordinate) < SAME_PLACE_KM);
        if !duplicate {
            kept.push(hit);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(lat: f64, lng: f64, score: f64) -> Hit {
        Hit {
            coordinate: Coordinate::new(lat, lng).unwrap(),
            address: format!("{lat},{lng}"),
            score,
        }
    }

    #[test]
    fn plausible_hits_drops_low_scores_and_duplicates() {
        let hits = vec![
            hit(49.33, -122.95, 98.0),
            hit(49.331, -122.951, 97.0),
            hit(48.68, -123.48, 95.0),
            hit(53.0, -120.0, 60.0),
        ];
        let kept = plausible_hits(hits, 5.0);
        assert_eq!(kept.len(), 2);
        assert!((kept[0].score - 98.0).abs() < f64::EPSILON);
        assert!((kept[1].coordinate.lat - 48.68).abs() < 1e-9);
    }

    fn geocoder() -> Geocoder {
        let http = HttpFetcher::with_settings("dispatch-test", 5, 0, 1).unwrap();
        let tables = dispatch_core::reference::load().unwrap();
        Geocoder::new(http, &AppConfig::default(), tables).unwrap()
    }

    #[test]
    fn distinct_place_inside_the_window_always_disambiguates() {
        let geocoder = geocoder();
        for second in [90.0, 87.5, 85.0] {
            let hits = vec![hit(50.70, -119.28, 90.0), hit(49.10, -122.30, second)];
            let result =
                geocoder.decide("Sorrento", hits, BC_SCORE_WINDOW, GeocodeSource::BcGeocoder);
            let Some(GeocodeResult::Ambiguous(d)) = &result else {
                panic!("score {second} should be ambiguous, got {result:?}");
            };
            assert_eq!(d.candidates().len(), 2);
        }

        let hits = vec![hit(50.70, -119.28, 90.0), hit(49.10, -122.30, 84.9)];
        let result =
            geocoder.decide("Sorrento", hits, BC_SCORE_WINDOW, GeocodeSource::BcGeocoder);
        assert!(matches!(
            result,
            Some(GeocodeResult::Resolved(place)) if (place.coordinate.lat - 50.70).abs() < 1e-9
        ));
    }

    #[test]
    fn plausible_hits_of_nothing_is_empty() {
        assert!(plausible_hits(Vec::new(), 5.0).is_empty());
    }
}
