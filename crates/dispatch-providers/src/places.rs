//! Google Places (New) text search and nearby search.

use std::cmp::Ordering;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use dispatch_core::{AppConfig, Coordinate, Lodging};

use crate::error::ProviderError;
use crate::http::{endpoint, HttpFetcher};

const FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.nationalPhoneNumber,\
places.location,places.websiteUri,places.rating";

/// A place as returned by either search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    places: Vec<RawPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlace {
    #[serde(default)]
    display_name: Option<LocalizedText>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    national_phone_number: Option<String>,
    #[serde(default)]
    website_uri: Option<String>,
    #[serde(default)]
    location: Option<LatLng>,
    #[serde(default)]
    rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: LatLng,
    radius: f64,
}

#[derive(Debug, Serialize)]
struct Area {
    circle: Circle,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextSearchBody<'a> {
    text_query: &'a str,
    max_result_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_bias: Option<Area>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NearbySearchBody<'a> {
    included_types: &'a [&'a str],
    max_result_count: u32,
    location_restriction: Area,
}

fn area(center: Coordinate, radius_m: f64) -> Area {
    Area {
        circle: Circle {
            center: LatLng {
                latitude: center.lat,
                longitude: center.lng,
            },
            radius: radius_m,
        },
    }
}

impl From<RawPlace> for Place {
    fn from(raw: RawPlace) -> Self {
        Self {
            name: raw.display_name.map(|t| t.text).unwrap_or_default(),
            address: raw.formatted_address.unwrap_or_default(),
            phone: raw.national_phone_number,
            website: raw.website_uri,
            coordinate: raw
                .location
                .and_then(|l| Coordinate::new(l.latitude, l.longitude).ok()),
            rating: raw.rating,
        }
    }
}

/// Client for the Places text and nearby endpoints. Every call fails with
/// [`ProviderError::MissingApiKey`] when no key is configured.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    http: HttpFetcher,
    search_url: Url,
    nearby_url: Url,
    api_key: Option<String>,
}

impl PlacesClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if a configured endpoint is malformed.
    pub fn new(http: HttpFetcher, config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http,
            search_url: endpoint(&config.endpoints.places_url)?,
            nearby_url: endpoint(&config.endpoints.places_nearby_url)?,
            api_key: config.google_maps_api_key.clone(),
        })
    }

    #[must_use]
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("places search"))
    }

    /// Free-text search, optionally biased to a circle of `radius_m` metres.
    /// Places without a name are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on a missing key, network failure or malformed body.
    pub async fn search_text(
        &self,
        query: &str,
        bias: Option<(Coordinate, f64)>,
        max_results: u32,
    ) -> Result<Vec<Place>, ProviderError> {
        let key = self.key()?;
        let body = TextSearchBody {
            text_query: query,
            max_result_count: max_results,
            location_bias: bias.map(|(center, radius_m)| area(center, radius_m)),
        };
        let response: SearchResponse = self
            .http
            .post_json(
                &self.search_url,
                &[("X-Goog-Api-Key", key), ("X-Goog-FieldMask", FIELD_MASK)],
                &body,
                "places searchText",
            )
            .await?;
        let places: Vec<Place> = response
            .places
            .into_iter()
            .map(Place::from)
            .filter(|p| !p.name.is_empty())
            .take(max_results as usize)
            .collect();
        tracing::debug!(query, count = places.len(), "places text search");
        Ok(places)
    }

    /// Up to five lodging places within `radius_km`, best rated first.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on a missing key, network failure or malformed body.
    pub async fn nearby_lodging(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Lodging>, ProviderError> {
        let key = self.key()?;
        let body = NearbySearchBody {
            included_types: &["lodging"],
            max_result_count: 5,
            location_restriction: area(center, radius_km * 1000.0),
        };
        let response: SearchResponse = self
            .http
            .post_json(
                &self.nearby_url,
                &[("X-Goog-Api-Key", key), ("X-Goog-FieldMask", FIELD_MASK)],
                &body,
                "places searchNearby",
            )
            .await?;
        let mut lodging: Vec<Lodging> = response
            .places
            .into_iter()
            .map(Place::from)
            .filter(|p| !p.name.is_empty())
            .map(|p| Lodging {
                name: p.name,
                address: p.address,
                phone: p.phone,
                coordinate: p.coordinate,
                rating: p.rating,
            })
            .collect();
        lodging.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .partial_cmp(&a.rating.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        });
        Ok(lodging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_place_without_location_keeps_name() {
        let raw: RawPlace = serde_json::from_str(
            r#"{"displayName":{"text":"Whistler Health Care Centre"},"formattedAddress":"4380 Lorimer Rd"}"#,
        )
        .unwrap();
        let place = Place::from(raw);
        assert_eq!(place.name, "Whistler Health Care Centre");
        assert!(place.coordinate.is_none());
        assert!(place.phone.is_none());
    }

    #[test]
    fn text_body_omits_bias_when_absent() {
        let body = TextSearchBody {
            text_query: "Pemberton RCMP",
            max_result_count: 3,
            location_bias: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["textQuery"], "Pemberton RCMP");
        assert_eq!(json["maxResultCount"], 3);
        assert!(json.get("locationBias").is_none());
    }
}
