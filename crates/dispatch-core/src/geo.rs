//! Great-circle distance, bounding boxes, and the encoded-polyline codec.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_LAT_DEGREE: f64 = 111.0;

/// A WGS84 point. Construct through [`Coordinate::new`] to enforce the valid
/// latitude/longitude ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when either component is out of
    /// range or not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(CoreError::InvalidCoordinate { lat, lng })
        }
    }

    /// Re-checks a value that may have been deserialized without validation.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when out of range.
    pub fn validated(self) -> Result<Self, CoreError> {
        Self::new(self.lat, self.lng)
    }

    /// `"50.12, -122.95"`: two decimals, used wherever a place name is missing.
    #[must_use]
    pub fn short_label(&self) -> String {
        format!("{:.2}, {:.2}", self.lat, self.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Coordinate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidCoordinateText(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let lng = lng.trim().parse::<f64>().map_err(|_| invalid())?;
        Self::new(lat, lng)
    }
}

/// Haversine distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Round a distance to one decimal place, the precision every provider reports.
#[must_use]
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box around `center` reaching `radius_km` in each direction. The
    /// longitude span widens with latitude so the box stays roughly square on
    /// the ground.
    #[must_use]
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_LAT_DEGREE;
        let lng_delta = radius_km / (KM_PER_LAT_DEGREE * center.lat.to_radians().cos());
        Self {
            min_lat: center.lat - lat_delta,
            max_lat: center.lat + lat_delta,
            min_lng: center.lng - lng_delta,
            max_lng: center.lng + lng_delta,
        }
    }

    /// Corridor spanning both endpoints plus `padding_deg` on every side.
    #[must_use]
    pub fn corridor(origin: Coordinate, destination: Coordinate, padding_deg: f64) -> Self {
        Self {
            min_lat: origin.lat.min(destination.lat) - padding_deg,
            max_lat: origin.lat.max(destination.lat) + padding_deg,
            min_lng: origin.lng.min(destination.lng) - padding_deg,
            max_lng: origin.lng.max(destination.lng) + padding_deg,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }

    /// `minLng,minLat,maxLng,maxLat`, the order WFS and Open511 expect.
    #[must_use]
    pub fn to_lng_lat_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lng, self.min_lat, self.max_lng, self.max_lat
        )
    }
}

/// Decode a Google encoded polyline (precision 1e5).
///
/// Truncated input yields the points decoded so far.
#[must_use]
pub fn decode_polyline(encoded: &str) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0usize;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let Some(d_lat) = next_polyline_value(bytes, &mut index) else {
            break;
        };
        let Some(d_lng) = next_polyline_value(bytes, &mut index) else {
            break;
        };
        lat += d_lat;
        lng += d_lng;
        #[allow(clippy::cast_precision_loss)]
        points.push(Coordinate {
            lat: lat as f64 / 1e5,
            lng: lng as f64 / 1e5,
        });
    }

    points
}

fn next_polyline_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = i64::from(*bytes.get(*index)?) - 63;
        *index += 1;
        result |= (byte & 0x1f) << shift;
        shift += 5;
        if byte < 0x20 || shift > 60 {
            break;
        }
    }
    Some(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Inverse of [`decode_polyline`]; only the decoder's tests need it.
#[cfg(test)]
fn encode_polyline(points: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        #[allow(clippy::cast_possible_truncation)]
        let lat = (point.lat * 1e5).round() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let lng = (point.lng * 1e5).round() as i64;
        push_polyline_value(&mut out, lat - prev_lat);
        push_polyline_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

#[cfg(test)]
fn push_polyline_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        out.push(char::from((0x20 | (v & 0x1f)) as u8 + 63));
        v >>= 5;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    out.push(char::from(v as u8 + 63));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn coordinate_rejects_out_of_range_values() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn coordinate_parses_from_text() {
        let parsed: Coordinate = "49.28, -123.12".parse().unwrap();
        assert_eq!(parsed, c(49.28, -123.12));
        assert!("49.28".parse::<Coordinate>().is_err());
        assert!("north,west".parse::<Coordinate>().is_err());
        assert!("95,10".parse::<Coordinate>().is_err());
    }

    #[test]
    fn haversine_vancouver_to_kamloops() {
        let d = haversine_km(c(49.2827, -123.1207), c(50.6745, -120.3273));
        assert!((d - 253.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn haversine_is_zero_for_same_point() {
        let p = c(50.1163, -122.9574);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn round_km_keeps_one_decimal() {
        assert!((round_km(12.345) - 12.3).abs() < 1e-9);
        assert!((round_km(12.36) - 12.4).abs() < 1e-9);
    }

    #[test]
    fn corridor_pads_min_and_max() {
        let bbox = BoundingBox::corridor(c(49.0, -123.0), c(50.0, -120.0), 0.5);
        assert_eq!(bbox.min_lat, 48.5);
        assert_eq!(bbox.max_lat, 50.5);
        assert_eq!(bbox.min_lng, -123.5);
        assert_eq!(bbox.max_lng, -119.5);
        assert_eq!(bbox.to_lng_lat_string(), "-123.5,48.5,-119.5,50.5");
    }

    #[test]
    fn corridor_is_independent_of_endpoint_order() {
        let a = c(49.0, -123.0);
        let b = c(50.0, -120.0);
        assert_eq!(
            BoundingBox::corridor(a, b, 0.5),
            BoundingBox::corridor(b, a, 0.5)
        );
    }

    #[test]
    fn box_around_point_contains_center() {
        let center = c(50.0, -122.0);
        let bbox = BoundingBox::around(center, 50.0);
        assert!(bbox.contains(center));
        assert!(bbox.max_lng - bbox.min_lng > bbox.max_lat - bbox.min_lat);
    }

    #[test]
    fn decodes_reference_polyline() {
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
        assert_eq!(points.len(), 3);
        assert!((points[0].lat - 38.5).abs() < 1e-5);
        assert!((points[0].lng - -120.2).abs() < 1e-5);
        assert!((points[1].lat - 40.7).abs() < 1e-5);
        assert!((points[1].lng - -120.95).abs() < 1e-5);
        assert!((points[2].lat - 43.252).abs() < 1e-5);
        assert!((points[2].lng - -126.453).abs() < 1e-5);
    }

    #[test]
    fn polyline_round_trip_preserves_order_within_tolerance() {
        let path = vec![
            c(49.28273, -123.12074),
            c(49.70163, -123.15578),
            c(50.11632, -122.95736),
            c(50.32061, -122.80258),
        ];
        let decoded = decode_polyline(&encode_polyline(&path));
        assert_eq!(decoded.len(), path.len());
        for (orig, back) in path.iter().zip(&decoded) {
            assert!((orig.lat - back.lat).abs() <= 1e-5);
            assert!((orig.lng - back.lng).abs() <= 1e-5);
        }
    }

    #[test]
    fn truncated_polyline_stops_cleanly() {
        assert!(decode_polyline("").is_empty());
        assert_eq!(decode_polyline("_p~iF~ps|U_ulL").len(), 1);
    }
}
