//! Pure merge of fan-out results into a [`BriefingRecord`]. No I/O.

use chrono::{DateTime, Utc};

use dispatch_core::{
    BriefingRecord, CommunityOps, Confidence, Domain, DomainStatus, EvacuationAlert, Fire,
    FirstNation, GeocodedLocation, GeocodedPlace, MajorEmployer, PoiCategory, PoiEntry,
    PointsOfInterest, ProviderResult, ReferenceTables, RoadEvent, TravelInfo, WaterSource,
    Weather,
};
use dispatch_providers::fires::within_radius;

/// Fires farther than this from the destination are not listed as nearby.
pub const NEARBY_FIRE_RADIUS_KM: f64 = 100.0;

/// Everything the orchestrator collected for one request.
#[derive(Debug, Clone)]
pub struct BriefingParts {
    pub community: String,
    pub fire_number: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub destination: GeocodedPlace,
    /// `None` when no usable origin was given.
    pub travel: Option<ProviderResult<TravelInfo>>,
    pub fires: ProviderResult<Vec<Fire>>,
    pub weather: ProviderResult<Weather>,
    pub first_nations: ProviderResult<Vec<FirstNation>>,
    pub employers: ProviderResult<Vec<MajorEmployer>>,
    pub water_sources: ProviderResult<Vec<WaterSource>>,
    pub points_of_interest: Vec<(PoiCategory, ProviderResult<Vec<PoiEntry>>)>,
    pub road_events: ProviderResult<Vec<RoadEvent>>,
    pub community_ops: ProviderResult<CommunityOps>,
    pub evacuation_alerts: ProviderResult<Vec<EvacuationAlert>>,
}

/// The requested fire (matched case-insensitively on fire number) and the
/// other fires within [`NEARBY_FIRE_RADIUS_KM`], never including it.
#[must_use]
pub fn split_fires(fires: &[Fire], fire_number: Option<&str>) -> (Option<Fire>, Vec<Fire>) {
    let requested = fire_number.map(str::trim).filter(|n| !n.is_empty());
    let is_requested =
        |f: &Fire| requested.is_some_and(|n| f.fire_number.eq_ignore_ascii_case(n));
    let specific = fires.iter().find(|f| is_requested(f)).cloned();
    let nearby = within_radius(fires, NEARBY_FIRE_RADIUS_KM)
        .into_iter()
        .filter(|f| !is_requested(f))
        .collect();
    (specific, nearby)
}

fn located(place: GeocodedPlace) -> GeocodedLocation {
    GeocodedLocation {
        confidence: Confidence::from_score(place.score),
        coordinate: place.coordinate,
        formatted_address: place.formatted_address,
        score: place.score,
        source: place.source,
    }
}

/// Coverage entries in registration order: route first when requested,
/// then every always-fetched domain.
fn coverage(parts: &BriefingParts) -> Vec<DomainStatus> {
    let mut statuses = Vec::with_capacity(Domain::ALWAYS.len() + 1);
    if let Some(travel) = &parts.travel {
        statuses.push(DomainStatus::from_result(Domain::Route, travel));
    }
    for domain in Domain::ALWAYS {
        let status = match domain {
            Domain::Route => continue,
            Domain::Fires => DomainStatus::from_result(domain, &parts.fires),
            Domain::Weather => DomainStatus::from_result(domain, &parts.weather),
            Domain::FirstNations => DomainStatus::from_result(domain, &parts.first_nations),
            Domain::Employers => DomainStatus::from_result(domain, &parts.employers),
            Domain::WaterSources => DomainStatus::from_result(domain, &parts.water_sources),
            Domain::RoadEvents => DomainStatus::from_result(domain, &parts.road_events),
            Domain::CommunityOps => DomainStatus::from_result(domain, &parts.community_ops),
            Domain::EvacuationAlerts => {
                DomainStatus::from_result(domain, &parts.evacuation_alerts)
            }
            Domain::PoiFireDepartment
            | Domain::PoiHospital
            | Domain::PoiRcmp
            | Domain::PoiGrocery
            | Domain::PoiHotel => match parts
                .points_of_interest
                .iter()
                .find(|(category, _)| category.domain() == domain)
            {
                Some((_, result)) => DomainStatus::from_result(domain, result),
                None => DomainStatus {
                    domain,
                    ok: false,
                    reason: Some("not requested".to_string()),
                },
            },
        };
        statuses.push(status);
    }
    statuses
}

/// Assemble the immutable record. Failed domains become `None` fields.
#[must_use]
pub fn build(parts: BriefingParts, tables: &ReferenceTables) -> BriefingRecord {
    let coverage = coverage(&parts);
    let fire_number = parts
        .fire_number
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let (fire, nearby_fires) = match parts.fires.value() {
        Some(all) => {
            let (fire, nearby) = split_fires(all, fire_number.as_deref());
            (fire, Some(nearby))
        }
        None => (None, None),
    };

    let mut points_of_interest = PointsOfInterest::default();
    for (category, result) in parts.points_of_interest {
        points_of_interest.set(category, result.into_value());
    }

    BriefingRecord {
        regional_contact: tables.regional_contact(&parts.community).cloned(),
        community: parts.community,
        fire_number,
        generated_at: parts.generated_at,
        location: Some(located(parts.destination)),
        travel: parts.travel.and_then(ProviderResult::into_value),
        fire,
        nearby_fires,
        weather: parts.weather.into_value(),
        first_nations: parts.first_nations.into_value(),
        points_of_interest,
        water_sources: parts.water_sources.into_value(),
        major_employers: parts.employers.into_value(),
        community_ops: parts.community_ops.into_value(),
        road_events: parts.road_events.into_value(),
        evacuation_alerts: parts.evacuation_alerts.into_value(),
        coverage,
    }
}
