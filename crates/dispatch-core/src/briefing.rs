//! The briefing record and the per-domain entries it aggregates.
//!
//! Every section of [`BriefingRecord`] is an explicit `Option`: `None` means
//! the provider for that domain failed or timed out, which is different from
//! `Some(vec![])` (the provider answered and found nothing).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::geocode::GeocodeSource;
use crate::provider::{Domain, DomainStatus};
use crate::route::RouteEstimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Fallback,
}

impl Confidence {
    /// Geocoder match score (0–100) to label.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Confidence::High
        } else if score >= 70.0 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedLocation {
    pub coordinate: Coordinate,
    pub formatted_address: String,
    pub score: f64,
    pub confidence: Confidence,
    pub source: GeocodeSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fire {
    pub fire_number: String,
    pub name: String,
    pub status: String,
    /// Hectares.
    pub size: f64,
    pub coordinate: Coordinate,
    pub fire_of_note: bool,
    pub url: String,
    pub cause: Option<String>,
    pub fire_centre: Option<String>,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCurrent {
    pub temperature_c: Option<f64>,
    pub condition: Option<String>,
    pub humidity_pct: Option<u8>,
    pub wind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPeriod {
    /// `"Friday"` or `"Friday night"`.
    pub day: String,
    pub summary: String,
    pub high: Option<i32>,
    pub low: Option<i32>,
    /// Probability of precipitation, percent.
    pub pop: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub location: String,
    pub station_code: String,
    pub current: Option<WeatherCurrent>,
    pub forecast: Vec<WeatherPeriod>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstNation {
    pub name: String,
    pub band_number: Option<u32>,
    pub coordinate: Coordinate,
    pub distance_km: f64,
    pub pronunciation: Option<String>,
    pub pronunciation_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorEmployer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: Option<String>,
    pub coordinate: Coordinate,
    pub distance_km: f64,
    pub employee_estimate: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterSource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinate: Coordinate,
    pub distance_km: f64,
    pub access_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    FireDepartment,
    Hospital,
    Rcmp,
    GroceryStore,
    Hotel,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 5] = [
        PoiCategory::FireDepartment,
        PoiCategory::Hospital,
        PoiCategory::Rcmp,
        PoiCategory::GroceryStore,
        PoiCategory::Hotel,
    ];

    /// Key used in the query-variation table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PoiCategory::FireDepartment => "fire department",
            PoiCategory::Hospital => "hospital",
            PoiCategory::Rcmp => "rcmp",
            PoiCategory::GroceryStore => "grocery store",
            PoiCategory::Hotel => "hotel",
        }
    }

    #[must_use]
    pub fn domain(self) -> Domain {
        match self {
            PoiCategory::FireDepartment => Domain::PoiFireDepartment,
            PoiCategory::Hospital => Domain::PoiHospital,
            PoiCategory::Rcmp => Domain::PoiRcmp,
            PoiCategory::GroceryStore => Domain::PoiGrocery,
            PoiCategory::Hotel => Domain::PoiHotel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiEntry {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub confidence: Confidence,
    /// `"Google Places"`, `"Nearby: <town>"`, `"Regional District"`, or `"Provincial"`.
    pub source: String,
}

/// One list per category; `None` when that category's lookup failed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsOfInterest {
    pub fire_department: Option<Vec<PoiEntry>>,
    pub hospital: Option<Vec<PoiEntry>>,
    pub rcmp: Option<Vec<PoiEntry>>,
    pub grocery_store: Option<Vec<PoiEntry>>,
    pub hotel: Option<Vec<PoiEntry>>,
}

impl PointsOfInterest {
    pub fn set(&mut self, category: PoiCategory, entries: Option<Vec<PoiEntry>>) {
        let slot = match category {
            PoiCategory::FireDepartment => &mut self.fire_department,
            PoiCategory::Hospital => &mut self.hospital,
            PoiCategory::Rcmp => &mut self.rcmp,
            PoiCategory::GroceryStore => &mut self.grocery_store,
            PoiCategory::Hotel => &mut self.hotel,
        };
        *slot = entries;
    }

    #[must_use]
    pub fn get(&self, category: PoiCategory) -> Option<&[PoiEntry]> {
        match category {
            PoiCategory::FireDepartment => self.fire_department.as_deref(),
            PoiCategory::Hospital => self.hospital.as_deref(),
            PoiCategory::Rcmp => self.rcmp.as_deref(),
            PoiCategory::GroceryStore => self.grocery_store.as_deref(),
            PoiCategory::Hotel => self.hotel.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalContact {
    pub name: String,
    pub phone: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadEvent {
    pub id: String,
    pub event_type: String,
    pub severity: String,
    pub headline: String,
    pub description: String,
    pub road_name: String,
    pub direction: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvacuationKind {
    Order,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EvacuationKind,
    pub issued_by: String,
    pub event_name: String,
    pub status: String,
    pub issued_date: Option<String>,
    pub distance_km: f64,
    /// `"High"`, `"Medium"` or `"Low"`, from kind and distance.
    pub severity: String,
}

/// Lodging near the overnight stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lodging {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelInfo {
    pub route: RouteEstimate,
    pub overnight_lodging: Vec<Lodging>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawsStation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ffmc: Option<f64>,
    #[serde(default)]
    pub isi: Option<f64>,
    #[serde(default)]
    pub fwi: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Fuel,
    Mechanical,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub is_24h: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagingKind {
    Staging,
    Helipad,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingArea {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StagingKind,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub capacity: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Infrastructure {
    pub power: String,
    pub telecom: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub name: String,
    pub services: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionCentre {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAndTopo {
    pub prevailing_winds: String,
    pub topo_notes: String,
    #[serde(default)]
    pub hazard_tree_risk: Option<String>,
    #[serde(default)]
    pub beetle_kill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirSupport {
    #[serde(default)]
    pub nearest_tanker_base: Option<String>,
    #[serde(default)]
    pub nearest_rappel_base: Option<String>,
    #[serde(default)]
    pub local_helipads: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Locally maintained operational data for one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityOpsProfile {
    pub community: String,
    pub eoc_contacts: Vec<Contact>,
    #[serde(default)]
    pub raws_station: Option<RawsStation>,
    #[serde(default)]
    pub fuel_and_mechanical: Vec<ServiceProvider>,
    #[serde(default)]
    pub staging_areas: Vec<StagingArea>,
    #[serde(default)]
    pub access_constraints: Vec<String>,
    pub infrastructure: Infrastructure,
    #[serde(default)]
    pub heavy_equipment_contractors: Vec<Contractor>,
    #[serde(default)]
    pub ess_reception_centre: Option<ReceptionCentre>,
    pub weather_and_topo: WeatherAndTopo,
    pub air_support: AirSupport,
    #[serde(default)]
    pub hospital_trauma_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityOps {
    pub community: String,
    pub data_available: bool,
    pub profile: Option<CommunityOpsProfile>,
    pub message: Option<String>,
    pub suggested_contacts: Vec<Contact>,
    pub disclaimer: Option<String>,
}

/// The merged, immutable result of one briefing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingRecord {
    pub community: String,
    pub fire_number: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub location: Option<GeocodedLocation>,
    pub travel: Option<TravelInfo>,
    pub fire: Option<Fire>,
    pub nearby_fires: Option<Vec<Fire>>,
    pub weather: Option<Weather>,
    pub first_nations: Option<Vec<FirstNation>>,
    pub points_of_interest: PointsOfInterest,
    pub regional_contact: Option<RegionalContact>,
    pub water_sources: Option<Vec<WaterSource>>,
    pub major_employers: Option<Vec<MajorEmployer>>,
    pub community_ops: Option<CommunityOps>,
    pub road_events: Option<Vec<RoadEvent>>,
    pub evacuation_alerts: Option<Vec<EvacuationAlert>>,
    /// One entry per domain fetched for this request, in registration order.
    pub coverage: Vec<DomainStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_thresholds() {
        assert_eq!(Confidence::from_score(100.0), Confidence::High);
        assert_eq!(Confidence::from_score(90.0), Confidence::High);
        assert_eq!(Confidence::from_score(89.9), Confidence::Medium);
        assert_eq!(Confidence::from_score(70.0), Confidence::Medium);
        assert_eq!(Confidence::from_score(12.0), Confidence::Low);
    }

    #[test]
    fn poi_slots_are_independent() {
        let mut pois = PointsOfInterest::default();
        pois.set(PoiCategory::Hospital, Some(vec![]));
        assert_eq!(pois.get(PoiCategory::Hospital), Some(&[][..]));
        assert_eq!(pois.get(PoiCategory::Rcmp), None);
    }

    #[test]
    fn orders_sort_before_alerts() {
        assert!(EvacuationKind::Order < EvacuationKind::Alert);
    }
}
