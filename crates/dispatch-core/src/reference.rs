//! Read-only lookup tables, parsed once per process from YAML embedded at
//! compile time.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::briefing::{CommunityOpsProfile, PoiCategory, RegionalContact};
use crate::geo::{haversine_km, BoundingBox, Coordinate};
use crate::geocode::GeocodeCandidate;
use crate::ConfigError;

/// Island regions reachable only by ferry.
pub const ISLAND_REGIONS: &[IslandRegion] = &[
    IslandRegion {
        name: "Vancouver Island",
        bounds: BoundingBox {
            min_lat: 48.3,
            max_lat: 50.8,
            min_lng: -128.5,
            max_lng: -123.3,
        },
    },
    IslandRegion {
        name: "Haida Gwaii",
        bounds: BoundingBox {
            min_lat: 51.9,
            max_lat: 54.3,
            min_lng: -133.2,
            max_lng: -131.0,
        },
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IslandRegion {
    pub name: &'static str,
    pub bounds: BoundingBox,
}

/// The island region containing `point`, if any.
#[must_use]
pub fn island_region(point: Coordinate) -> Option<&'static IslandRegion> {
    ISLAND_REGIONS.iter().find(|r| r.bounds.contains(point))
}

#[derive(Debug, Clone, Deserialize)]
struct RegionalDistrictsFile {
    districts: HashMap<String, RegionalContact>,
    communities: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherStation {
    pub city: String,
    pub code: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl WeatherStation {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate {
            lat: self.lat?,
            lng: self.lng?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PronunciationHint {
    pub name: String,
    pub hint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerSeed {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub employee_estimate: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterSourceSeed {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub access_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Locality {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub district: String,
}

impl Locality {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverridePlace {
    lat: f64,
    lng: f64,
    formatted_address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverrideCandidate {
    lat: f64,
    lng: f64,
    display_name: String,
    formatted_address: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OverrideEntry {
    names: Vec<String>,
    #[serde(default)]
    place: Option<OverridePlace>,
    #[serde(default)]
    candidates: Vec<OverrideCandidate>,
}

/// Hand-maintained correction for a place name.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOverride {
    Place {
        coordinate: Coordinate,
        formatted_address: String,
    },
    Ambiguous(Vec<GeocodeCandidate>),
}

/// Every static table the providers consult.
#[derive(Debug)]
pub struct ReferenceTables {
    districts: HashMap<String, RegionalContact>,
    community_districts: HashMap<String, String>,
    nearby_towns: HashMap<String, Vec<String>>,
    poi_variations: HashMap<PoiCategory, Vec<String>>,
    weather_stations: Vec<WeatherStation>,
    pronunciation_hints: Vec<PronunciationHint>,
    employers: Vec<EmployerSeed>,
    water_sources: Vec<WaterSourceSeed>,
    community_ops: HashMap<String, CommunityOpsProfile>,
    localities: Vec<Locality>,
    geocode_overrides: HashMap<String, GeocodeOverride>,
}

static TABLES: LazyLock<Result<ReferenceTables, ConfigError>> =
    LazyLock::new(ReferenceTables::parse);

/// Process-wide tables, parsed on first use.
///
/// # Errors
///
/// Returns the parse error of the first embedded table that is malformed.
pub fn load() -> Result<&'static ReferenceTables, &'static ConfigError> {
    TABLES.as_ref()
}

fn parse_table<T: DeserializeOwned>(table: &'static str, raw: &str) -> Result<T, ConfigError> {
    serde_yaml::from_str(raw).map_err(|source| ConfigError::ReferenceTable { table, source })
}

/// Lowercase and collapse internal whitespace: the key form used by the
/// community-keyed tables.
#[must_use]
pub fn normalize_community(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl ReferenceTables {
    fn parse() -> Result<Self, ConfigError> {
        let districts_file: RegionalDistrictsFile = parse_table(
            "regional_districts",
            include_str!("seed/regional_districts.yaml"),
        )?;
        let overrides: Vec<OverrideEntry> = parse_table(
            "geocode_overrides",
            include_str!("seed/geocode_overrides.yaml"),
        )?;

        let mut geocode_overrides = HashMap::new();
        for entry in overrides {
            let resolved = match entry.place {
                Some(place) => GeocodeOverride::Place {
                    coordinate: Coordinate {
                        lat: place.lat,
                        lng: place.lng,
                    },
                    formatted_address: place.formatted_address,
                },
                None => GeocodeOverride::Ambiguous(
                    entry
                        .candidates
                        .into_iter()
                        .map(|c| GeocodeCandidate {
                            coordinate: Coordinate {
                                lat: c.lat,
                                lng: c.lng,
                            },
                            display_name: c.display_name,
                            formatted_address: c.formatted_address,
                        })
                        .collect(),
                ),
            };
            for name in entry.names {
                geocode_overrides.insert(normalize_community(&name), resolved.clone());
            }
        }

        Ok(Self {
            districts: districts_file.districts,
            community_districts: districts_file.communities,
            nearby_towns: parse_table("nearby_towns", include_str!("seed/nearby_towns.yaml"))?,
            poi_variations: parse_table(
                "poi_variations",
                include_str!("seed/poi_variations.yaml"),
            )?,
            weather_stations: parse_table(
                "weather_stations",
                include_str!("seed/weather_stations.yaml"),
            )?,
            pronunciation_hints: parse_table(
                "pronunciation_hints",
                include_str!("seed/pronunciation_hints.yaml"),
            )?,
            employers: parse_table("employers", include_str!("seed/employers.yaml"))?,
            water_sources: parse_table("water_sources", include_str!("seed/water_sources.yaml"))?,
            community_ops: parse_table("community_ops", include_str!("seed/community_ops.yaml"))?,
            localities: parse_table("localities", include_str!("seed/localities.yaml"))?,
            geocode_overrides,
        })
    }

    /// Regional district serving `community`.
    #[must_use]
    pub fn regional_contact(&self, community: &str) -> Option<&RegionalContact> {
        let key = self.community_districts.get(&normalize_community(community))?;
        self.districts.get(key)
    }

    #[must_use]
    pub fn district(&self, key: &str) -> Option<&RegionalContact> {
        self.districts.get(key)
    }

    #[must_use]
    pub fn nearby_towns(&self, community: &str) -> &[String] {
        self.nearby_towns
            .get(&normalize_community(community))
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn poi_variations(&self, category: PoiCategory) -> &[String] {
        self.poi_variations
            .get(&category)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn weather_stations(&self) -> &[WeatherStation] {
        &self.weather_stations
    }

    /// Exact name first, then the first hint whose name appears anywhere in
    /// `name` (case-insensitive).
    #[must_use]
    pub fn pronunciation_hint(&self, name: &str) -> Option<&str> {
        if let Some(hit) = self.pronunciation_hints.iter().find(|h| h.name == name) {
            return Some(&hit.hint);
        }
        let lowered = name.to_lowercase();
        self.pronunciation_hints
            .iter()
            .find(|h| lowered.contains(&h.name.to_lowercase()))
            .map(|h| h.hint.as_str())
    }

    #[must_use]
    pub fn employers(&self) -> &[EmployerSeed] {
        &self.employers
    }

    #[must_use]
    pub fn water_sources(&self) -> &[WaterSourceSeed] {
        &self.water_sources
    }

    /// Looks up by name lowercased with all whitespace removed.
    #[must_use]
    pub fn community_ops(&self, community: &str) -> Option<&CommunityOpsProfile> {
        let key: String = community
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        self.community_ops.get(&key)
    }

    #[must_use]
    pub fn nearest_locality(&self, point: Coordinate) -> Option<&Locality> {
        self.localities.iter().min_by(|a, b| {
            haversine_km(point, a.coordinate()).total_cmp(&haversine_km(point, b.coordinate()))
        })
    }

    #[must_use]
    pub fn geocode_override(&self, query: &str) -> Option<&GeocodeOverride> {
        self.geocode_overrides.get(&normalize_community(query))
    }
}
