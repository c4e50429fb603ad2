//! Major employers near a point: the static seed list, topped up from
//! Places when the seed is thin.

use futures::future::join_all;

use dispatch_core::{haversine_km, round_km, Coordinate, MajorEmployer, ReferenceTables};

use crate::error::ProviderError;
use crate::places::PlacesClient;

const MAX_RESULTS: usize = 10;
/// Places is only consulted when the seed yields fewer matches than this.
const SUPPLEMENT_BELOW: usize = 5;
const SEARCH_TYPES: [&str; 4] = ["hospital", "university", "factory", "mill"];

/// Seeded employers within `radius_km`, nearest first, at most ten.
#[must_use]
pub fn seeded_employers(
    tables: &ReferenceTables,
    center: Coordinate,
    radius_km: f64,
) -> Vec<MajorEmployer> {
    let mut employers: Vec<MajorEmployer> = tables
        .employers()
        .iter()
        .filter_map(|seed| {
            let coordinate = Coordinate::new(seed.lat, seed.lng).ok()?;
            Some(MajorEmployer {
                name: seed.name.clone(),
                kind: seed.kind.clone(),
                address: None,
                coordinate,
                distance_km: round_km(haversine_km(center, coordinate)),
                employee_estimate: seed.employee_estimate.clone(),
                notes: seed.notes.clone(),
            })
        })
        .filter(|e| e.distance_km <= radius_km)
        .collect();
    sort_and_truncate(&mut employers);
    employers
}

fn sort_and_truncate(employers: &mut Vec<MajorEmployer>) {
    employers.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.name.cmp(&b.name))
    });
    employers.truncate(MAX_RESULTS);
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A place is already listed when an existing name contains its first word.
fn already_listed(employers: &[MajorEmployer], name: &str) -> bool {
    let first_word = name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    employers
        .iter()
        .any(|e| e.name.to_lowercase().contains(&first_word))
}

/// Seeded employers, supplemented from Places when fewer than five match
/// and a key is configured. Supplement failures are logged and ignored.
///
/// # Errors
///
/// Currently infallible; the `Result` keeps the provider signature uniform.
pub async fn employers_near(
    tables: &ReferenceTables,
    places: &PlacesClient,
    center: Coordinate,
    radius_km: f64,
) -> Result<Vec<MajorEmployer>, ProviderError> {
    let mut employers = seeded_employers(tables, center, radius_km);
    if employers.len() >= SUPPLEMENT_BELOW || !places.has_key() {
        return Ok(employers);
    }

    let searches = SEARCH_TYPES.iter().map(|kind| async move {
        let query = format!("{kind} near {},{}", center.lat, center.lng);
        (
            *kind,
            places
                .search_text(&query, Some((center, radius_km * 1000.0)), 3)
                .await,
        )
    });

    for (kind, result) in join_all(searches).await {
        let found = match result {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(source = "places", search = kind, error = %e, "employer supplement failed");
                continue;
            }
        };
        for place in found {
            let Some(coordinate) = place.coordinate else {
                continue;
            };
            let distance_km = haversine_km(center, coordinate);
            if distance_km > radius_km || already_listed(&employers, &place.name) {
                continue;
            }
            employers.push(MajorEmployer {
                name: place.name,
                kind: capitalize(kind),
                address: Some(place.address).filter(|a| !a.is_empty()),
                coordinate,
                distance_km: round_km(distance_km),
                employee_estimate: None,
                notes: None,
            });
        }
    }

    sort_and_truncate(&mut employers);
    Ok(employers)
}
