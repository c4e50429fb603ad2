//! Minimal `GeoJSON` geometry helpers shared by the WFS and feature-service
//! clients. Coordinates arrive as `[lng, lat]`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use dispatch_core::Coordinate;

/// Field deserializer that falls back to `T::default()` when the value is
/// null or of an unexpected shape, so one malformed record cannot fail the
/// whole collection.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "P: DeserializeOwned + Default"))]
pub(crate) struct FeatureCollection<P> {
    #[serde(default = "Vec::new")]
    pub(crate) features: Vec<Feature<P>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "P: DeserializeOwned + Default"))]
pub(crate) struct Feature<P> {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) properties: P,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    #[serde(rename = "type", default)]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) coordinates: Value,
}

fn as_point(value: &Value) -> Option<Coordinate> {
    let pair = value.as_array()?;
    let lng = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    Coordinate::new(lat, lng).ok()
}

/// Every position in a geometry of any nesting depth, in document order.
fn positions(value: &Value, out: &mut Vec<Coordinate>) {
    if let Some(point) = as_point(value) {
        out.push(point);
        return;
    }
    if let Some(items) = value.as_array() {
        for item in items {
            positions(item, out);
        }
    }
}

impl Geometry {
    /// The point itself, or the first vertex of a line or polygon.
    pub(crate) fn first_point(&self) -> Option<Coordinate> {
        let mut all = Vec::new();
        positions(&self.coordinates, &mut all);
        all.into_iter().next()
    }

    /// Centroid for polygons, first vertex for everything else.
    pub(crate) fn representative_point(&self) -> Option<Coordinate> {
        if self.kind.ends_with("Polygon") {
            self.centroid()
        } else {
            self.first_point()
        }
    }

    /// Vertex average; adequate for the small polygons evacuation areas use.
    pub(crate) fn centroid(&self) -> Option<Coordinate> {
        let mut all = Vec::new();
        positions(&self.coordinates, &mut all);
        if all.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = all.len() as f64;
        let lat = all.iter().map(|c| c.lat).sum::<f64>() / n;
        let lng = all.iter().map(|c| c.lng).sum::<f64>() / n;
        Coordinate::new(lat, lng).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(json: &str) -> Geometry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn point_and_line_first_point() {
        let p = geometry(r#"{"type":"Point","coordinates":[-122.95,50.12]}"#);
        assert_eq!(p.first_point(), Some(Coordinate { lat: 50.12, lng: -122.95 }));

        let line = geometry(
            r#"{"type":"LineString","coordinates":[[-123.1,49.7],[-123.0,49.8]]}"#,
        );
        assert_eq!(line.first_point(), Some(Coordinate { lat: 49.7, lng: -123.1 }));
    }

    #[test]
    fn polygon_centroid_averages_vertices() {
        let poly = geometry(
            r#"{"type":"Polygon","coordinates":[[[-120.0,50.0],[-118.0,50.0],[-118.0,52.0],[-120.0,52.0]]]}"#,
        );
        let c = poly.centroid().unwrap();
        assert!((c.lat - 51.0).abs() < 1e-9);
        assert!((c.lng + 119.0).abs() < 1e-9);
        assert_eq!(poly.representative_point(), Some(c));

        let line = geometry(r#"{"type":"LineString","coordinates":[[-123.1,49.7],[-123.0,49.8]]}"#);
        assert_eq!(line.representative_point(), line.first_point());
    }

    #[derive(Debug, Default, Deserialize)]
    struct Named {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        rank: Option<u32>,
    }

    #[test]
    fn malformed_feature_fields_default_instead_of_failing() {
        let collection: FeatureCollection<Named> = serde_json::from_str(
            r#"{"features":[
                {"geometry":{"type":"Point","coordinates":[-120.3,50.7]},
                 "properties":{"name":"good","rank":3}},
                {"geometry":"not-a-geometry","properties":{"name":7,"rank":"three"}},
                {"properties":null},
                {}
            ]}"#,
        )
        .unwrap();

        assert_eq!(collection.features.len(), 4);
        let good = &collection.features[0];
        assert_eq!(good.properties.name.as_deref(), Some("good"));
        assert_eq!(good.properties.rank, Some(3));
        assert!(good.geometry.is_some());

        let bad = &collection.features[1];
        assert!(bad.geometry.is_none());
        assert!(bad.properties.name.is_none());
        assert!(bad.properties.rank.is_none());
        assert!(collection.features[2].properties.name.is_none());
        assert!(collection.features[3].geometry.is_none());
    }

    #[test]
    fn empty_geometry_has_no_point() {
        let g = geometry(r#"{"type":"Point","coordinates":[]}"#);
        assert!(g.first_point().is_none());
        assert!(g.centroid().is_none());
    }
}
