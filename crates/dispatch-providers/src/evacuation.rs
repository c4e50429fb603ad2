//! Evacuation orders and alerts from the provincial ArcGIS feature service.

use chrono::DateTime;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use dispatch_core::{
    haversine_km, round_km, AppConfig, Coordinate, EvacuationAlert, EvacuationKind,
};

use crate::error::ProviderError;
use crate::geojson::{lenient, FeatureCollection};
use crate::http::{endpoint, HttpFetcher};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AreaProperties {
    #[serde(default)]
    emrg_oaa_sysid: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    order_alert_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    order_alert_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    issuing_agency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    event_name: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient")]
    date_modified: Option<i64>,
}

fn parse_kind(status: &str) -> Option<EvacuationKind> {
    match status.trim().to_ascii_lowercase().as_str() {
        "order" => Some(EvacuationKind::Order),
        "alert" => Some(EvacuationKind::Alert),
        _ => None,
    }
}

/// Orders within 25 km are high; orders within 50 km and alerts within
/// 50 km are medium; everything else is low.
#[must_use]
pub fn evacuation_severity(kind: EvacuationKind, distance_km: f64) -> &'static str {
    match kind {
        EvacuationKind::Order if distance_km < 25.0 => "High",
        EvacuationKind::Order | EvacuationKind::Alert if distance_km < 50.0 => "Medium",
        _ => "Low",
    }
}

fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct EvacuationClient {
    http: HttpFetcher,
    url: Url,
}

impl EvacuationClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if the configured endpoint is malformed.
    pub fn new(http: HttpFetcher, config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http,
            url: endpoint(&config.endpoints.evacuation_url)?,
        })
    }

    /// Orders and alerts whose area lies within `radius_km` of `center`.
    /// Orders come first, then nearest first. "All clear" areas are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure or a malformed body.
    pub async fn near(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<EvacuationAlert>, ProviderError> {
        let collection: FeatureCollection<AreaProperties> = self
            .http
            .get_json(
                &self.url,
                &[
                    ("where", "1=1".to_string()),
                    ("geometry", format!("{},{}", center.lng, center.lat)),
                    ("geometryType", "esriGeometryPoint".to_string()),
                    ("inSR", "4326".to_string()),
                    ("spatialRel", "esriSpatialRelIntersects".to_string()),
                    ("distance", radius_km.to_string()),
                    ("units", "esriSRUnit_Kilometer".to_string()),
                    ("outFields", "*".to_string()),
                    ("outSR", "4326".to_string()),
                    ("f", "geojson".to_string()),
                ],
                "evacuation areas",
            )
            .await?;

        let mut alerts: Vec<EvacuationAlert> = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let props = feature.properties;
                let status = props.order_alert_status.unwrap_or_default();
                let kind = parse_kind(&status)?;
                let point = feature.geometry?.representative_point()?;
                let distance_km = round_km(haversine_km(center, point));
                let event_name = props.event_name.unwrap_or_default();
                Some(EvacuationAlert {
                    id: id_text(props.emrg_oaa_sysid.as_ref())
                        .or(props.order_alert_name)
                        .unwrap_or_else(|| format!("{event_name}-{status}")),
                    kind,
                    issued_by: props.issuing_agency.unwrap_or_default(),
                    status: status.trim().to_string(),
                    issued_date: props
                        .date_modified
                        .and_then(DateTime::from_timestamp_millis)
                        .map(|d| d.to_rfc3339()),
                    severity: evacuation_severity(kind, distance_km).to_string(),
                    distance_km,
                    event_name,
                })
            })
            .filter(|a| a.distance_km <= radius_km)
            .collect();

        alerts.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.distance_km.total_cmp(&b.distance_km))
                .then_with(|| a.id.cmp(&b.id))
        });
        tracing::debug!(count = alerts.len(), "evacuation areas fetched");
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_by_kind_and_distance() {
        assert_eq!(evacuation_severity(EvacuationKind::Order, 10.0), "High");
        assert_eq!(evacuation_severity(EvacuationKind::Order, 25.0), "Medium");
        assert_eq!(evacuation_severity(EvacuationKind::Order, 60.0), "Low");
        assert_eq!(evacuation_severity(EvacuationKind::Alert, 10.0), "Medium");
        assert_eq!(evacuation_severity(EvacuationKind::Alert, 50.0), "Low");
    }

    #[test]
    fn only_orders_and_alerts_parse() {
        assert_eq!(parse_kind("Order"), Some(EvacuationKind::Order));
        assert_eq!(parse_kind(" ALERT "), Some(EvacuationKind::Alert));
        assert_eq!(parse_kind("All Clear"), None);
    }

    #[test]
    fn numeric_and_string_ids() {
        assert_eq!(id_text(Some(&serde_json::json!(4512))).as_deref(), Some("4512"));
        assert_eq!(id_text(Some(&serde_json::json!("EO-1"))).as_deref(), Some("EO-1"));
        assert_eq!(id_text(Some(&serde_json::json!(""))), None);
        assert_eq!(id_text(None), None);
    }
}
