//! Active wildfires from the BC Wildfire Service open-data WFS.

use std::cmp::Ordering;

use reqwest::Url;
use serde::Deserialize;

use dispatch_core::{haversine_km, round_km, AppConfig, Coordinate, Fire};

use crate::error::ProviderError;
use crate::geojson::lenient;
use crate::http::{endpoint, HttpFetcher};

const FIRE_LAYER: &str = "WHSE_LAND_AND_NATURAL_RESOURCE.PROT_CURRENT_FIRE_PNTS_SP";
const INCIDENT_PAGE: &str = "https://wildfiresituation.nrs.gov.bc.ca/incidents";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default, deserialize_with = "lenient")]
    properties: FireProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct FireProperties {
    #[serde(default)]
    fire_number: Option<String>,
    #[serde(default)]
    fire_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    current_size: Option<f64>,
    #[serde(default)]
    fire_centre: Option<String>,
    #[serde(default)]
    geographic_description: Option<String>,
    #[serde(default)]
    fire_of_note_ind: Option<String>,
    #[serde(default)]
    fire_url: Option<String>,
    #[serde(default)]
    fire_cause: Option<String>,
    /// Geometry is BC Albers; these carry WGS84 directly.
    #[serde(default, deserialize_with = "lenient")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    longitude: Option<f64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl FireProperties {
    /// `None` for a record without a fire number or a usable position.
    fn into_fire(self, center: Coordinate) -> Option<Fire> {
        let fire_number = non_blank(self.fire_number)?;
        let coordinate = Coordinate::new(self.latitude?, self.longitude?).ok()?;
        let name = non_blank(self.geographic_description)
            .unwrap_or_else(|| format!("Fire {fire_number}"));
        let url =
            non_blank(self.fire_url).unwrap_or_else(|| format!("{INCIDENT_PAGE}/{fire_number}"));
        Some(Fire {
            name,
            url,
            status: self.fire_status.unwrap_or_default(),
            size: self.current_size.unwrap_or(0.0),
            coordinate,
            fire_of_note: self.fire_of_note_ind.as_deref() == Some("Y"),
            cause: non_blank(self.fire_cause),
            fire_centre: non_blank(self.fire_centre),
            distance_km: round_km(haversine_km(center, coordinate)),
            fire_number,
        })
    }
}

/// Distance ascending, then fires of note first, then larger first, then
/// fire number.
pub fn compare_fires(a: &Fire, b: &Fire) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| b.fire_of_note.cmp(&a.fire_of_note))
        .then_with(|| b.size.total_cmp(&a.size))
        .then_with(|| a.fire_number.cmp(&b.fire_number))
}

/// Fires within `radius_km`, keeping the order of `fires`.
#[must_use]
pub fn within_radius(fires: &[Fire], radius_km: f64) -> Vec<Fire> {
    fires
        .iter()
        .filter(|f| f.distance_km <= radius_km)
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub struct FiresClient {
    http: HttpFetcher,
    url: Url,
}

impl FiresClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if the configured endpoint is malformed.
    pub fn new(http: HttpFetcher, config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http,
            url: endpoint(&config.endpoints.fires_url)?,
        })
    }

    /// Every fire not yet declared out, with its distance from `center`,
    /// sorted by [`compare_fires`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure or a malformed body.
    pub async fn active_fires(&self, center: Coordinate) -> Result<Vec<Fire>, ProviderError> {
        let collection: FeatureCollection = self
            .http
            .get_json(
                &self.url,
                &[
                    ("service", "WFS".to_string()),
                    ("version", "1.0.0".to_string()),
                    ("request", "GetFeature".to_string()),
                    ("typeName", FIRE_LAYER.to_string()),
                    ("outputFormat", "json".to_string()),
                    ("CQL_FILTER", "FIRE_OUT_DATE IS NULL".to_string()),
                ],
                "fire points",
            )
            .await?;

        let mut fires: Vec<Fire> = collection
            .features
            .into_iter()
            .filter_map(|f| f.properties.into_fire(center))
            .collect();
        fires.sort_by(compare_fires);
        tracing::debug!(count = fires.len(), "active fires fetched");
        Ok(fires)
    }
}
