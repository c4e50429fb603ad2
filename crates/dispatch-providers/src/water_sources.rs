//! Firefighting water access near a point: the static seed list plus
//! Places results whenever a key is configured.

use futures::future::join_all;

use dispatch_core::{haversine_km, round_km, Coordinate, ReferenceTables, WaterSource};

use crate::error::ProviderError;
use crate::places::PlacesClient;

const MAX_RESULTS: usize = 10;
const SEARCH_TYPES: [&str; 4] = [
    "boat launch",
    "public beach water access",
    "water treatment plant",
    "reservoir",
];

fn source_kind(search: &str) -> &'static str {
    if search.contains("boat") {
        "boat launch"
    } else if search.contains("beach") {
        "beach"
    } else if search.contains("reservoir") {
        "reservoir"
    } else {
        "water treatment"
    }
}

/// Seeded sources within `radius_km`, nearest first, at most ten.
#[must_use]
pub fn seeded_water_sources(
    tables: &ReferenceTables,
    center: Coordinate,
    radius_km: f64,
) -> Vec<WaterSource> {
    let sources = tables
        .water_sources()
        .iter()
        .filter_map(|seed| {
            let coordinate = Coordinate::new(seed.lat, seed.lng).ok()?;
            Some(WaterSource {
                name: seed.name.clone(),
                kind: seed.kind.clone(),
                coordinate,
                distance_km: round_km(haversine_km(center, coordinate)),
                access_notes: seed.access_notes.clone(),
            })
        })
        .filter(|s| s.distance_km <= radius_km)
        .collect();
    dedupe_sort_truncate(sources)
}

/// First occurrence of each name wins, then nearest first, at most ten.
fn dedupe_sort_truncate(sources: Vec<WaterSource>) -> Vec<WaterSource> {
    let mut unique: Vec<WaterSource> = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique.iter().any(|u| u.name == source.name) {
            unique.push(source);
        }
    }
    unique.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.name.cmp(&b.name))
    });
    unique.truncate(MAX_RESULTS);
    unique
}

/// Seeded sources merged with Places results. Supplement failures are logged
/// and ignored.
///
/// # Errors
///
/// Currently infallible; the `Result` keeps the provider signature uniform.
pub async fn water_sources_near(
    tables: &ReferenceTables,
    places: &PlacesClient,
    center: Coordinate,
    radius_km: f64,
) -> Result<Vec<WaterSource>, ProviderError> {
    let mut sources = seeded_water_sources(tables, center, radius_km);
    if !places.has_key() {
        return Ok(sources);
    }

    let searches = SEARCH_TYPES.iter().map(|search| async move {
        let query = format!("{search} near {},{}", center.lat, center.lng);
        (
            *search,
            places
                .search_text(&query, Some((center, radius_km * 1000.0)), 3)
                .await,
        )
    });

    for (search, result) in join_all(searches).await {
        match result {
            Ok(found) => {
                for place in found {
                    let Some(coordinate) = place.coordinate else {
                        continue;
                    };
                    let distance_km = haversine_km(center, coordinate);
                    if distance_km <= radius_km {
                        sources.push(WaterSource {
                            name: place.name,
                            kind: source_kind(search).to_string(),
                            coordinate,
                            distance_km: round_km(distance_km),
                            access_notes: Some("Via Google Places".to_string()),
                        });
                    }
                }
            }
            Err(e) => {
                tracing::warn!(source = "places", search, error = %e, "water source supplement failed");
            }
        }
    }

    Ok(dedupe_sort_truncate(sources))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, distance_km: f64) -> WaterSource {
        WaterSource {
            name: name.to_string(),
            kind: "lake".to_string(),
            coordinate: Coordinate::new(50.1, -122.9).unwrap(),
            distance_km,
            access_notes: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_and_sorts() {
        let out = dedupe_sort_truncate(vec![
            source("Alta Lake", 4.0),
            source("Green Lake", 2.0),
            source("Alta Lake", 1.0),
        ]);
        let names: Vec<&str> = out.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Green Lake", "Alta Lake"]);
        assert!((out[1].distance_km - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn search_types_map_to_kinds() {
        assert_eq!(source_kind("boat launch"), "boat launch");
        assert_eq!(source_kind("public beach water access"), "beach");
        assert_eq!(source_kind("reservoir"), "reservoir");
        assert_eq!(source_kind("water treatment plant"), "water treatment");
    }

    #[test]
    fn whistler_has_seeded_lakes() {
        let tables = dispatch_core::reference::load().expect("embedded tables parse");
        let whistler = Coordinate::new(50.1163, -122.9574).unwrap();
        let list = seeded_water_sources(tables, whistler, 50.0);
        assert!(list.iter().any(|s| s.name == "Green Lake"));
        assert!(list.len() <= MAX_RESULTS);
    }
}
