//! First Nations community locations from the federal WFS, with approximate
//! pronunciation hints attached.

use reqwest::Url;
use serde::Deserialize;

use dispatch_core::{
    haversine_km, round_km, AppConfig, BoundingBox, Coordinate, FirstNation, ReferenceTables,
};

use crate::error::ProviderError;
use crate::geojson::{lenient, FeatureCollection};
use crate::http::{endpoint, HttpFetcher};

pub const PRONUNCIATION_NOTE: &str = "Approximate phonetic guide - please verify with community";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct NationProperties {
    #[serde(default, deserialize_with = "lenient")]
    band_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    band_number: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct FirstNationsClient {
    http: HttpFetcher,
    primary_url: Url,
    alternate_url: Url,
    tables: &'static ReferenceTables,
}

impl FirstNationsClient {
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
            primary_url: endpoint(&config.endpoints.first_nations_url)?,
            alternate_url: endpoint(&config.endpoints.first_nations_alt_url)?,
            tables,
        })
    }

    /// Nations within `radius_km` of `center`, nearest first. The alternate
    /// endpoint is tried when the primary fails.
    ///
    /// # Errors
    ///
    /// Returns the alternate endpoint's error when both endpoints fail.
    pub async fn near(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<FirstNation>, ProviderError> {
        let bbox = BoundingBox::around(center, radius_km).to_lng_lat_string();

        let collection = match self.fetch_primary(&bbox).await {
            Ok(collection) => collection,
            Err(e) => {
                tracing::warn!(error = %e, "first nations primary endpoint failed; trying alternate");
                self.fetch_alternate(&bbox).await?
            }
        };

        let mut nations: Vec<FirstNation> = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let coordinate = feature.geometry?.first_point()?;
                let props = feature.properties;
                let name = props
                    .band_name
                    .or(props.name)
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "Unknown".to_string());
                let pronunciation = self.tables.pronunciation_hint(&name).map(str::to_string);
                Some(FirstNation {
                    pronunciation_note: pronunciation
                        .as_ref()
                        .map(|_| PRONUNCIATION_NOTE.to_string()),
                    pronunciation,
                    band_number: props.band_number,
                    distance_km: round_km(haversine_km(center, coordinate)),
                    coordinate,
                    name,
                })
            })
            .filter(|n| n.distance_km <= radius_km)
            .collect();

        nations.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.name.cmp(&b.name))
        });
        tracing::debug!(count = nations.len(), "first nations fetched");
        Ok(nations)
    }

    async fn fetch_primary(
        &self,
        bbox: &str,
    ) -> Result<FeatureCollection<NationProperties>, ProviderError> {
        self.http
            .get_json(
                &self.primary_url,
                &[
                    ("service", "WFS".to_string()),
                    ("version", "1.1.0".to_string()),
                    ("request", "GetFeature".to_string()),
                    ("typename", "cippn-fnpim:FN_Location_BC".to_string()),
                    ("outputFormat", "json".to_string()),
                    ("srsName", "EPSG:4326".to_string()),
                    ("bbox", bbox.to_string()),
                ],
                "first nations primary",
            )
            .await
    }

    async fn fetch_alternate(
        &self,
        bbox: &str,
    ) -> Result<FeatureCollection<NationProperties>, ProviderError> {
        self.http
            .get_json(
                &self.alternate_url,
                &[
                    ("service", "WFS".to_string()),
                    ("version", "2.0.0".to_string()),
                    ("request", "GetFeature".to_string()),
                    ("typeNames", "FN_Location_BC".to_string()),
                    ("outputFormat", "application/json".to_string()),
                    ("srsName", "EPSG:4326".to_string()),
                    ("bbox", format!("{bbox},EPSG:4326")),
                ],
                "first nations alternate",
            )
            .await
    }
}
