//! The uniform fetch-or-absent result every upstream call is folded into.

use serde::{Deserialize, Serialize};

/// Outcome of one provider call. A failure never propagates past the
/// orchestrator; it only leaves the matching briefing section empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult<T> {
    Fetched(T),
    Unavailable { reason: String },
}

impl<T> ProviderResult<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn ok(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fetched(v) => Some(v),
            Self::Unavailable { .. } => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Fetched(v) => Some(v),
            Self::Unavailable { .. } => None,
        }
    }

    #[must_use]
    pub fn failed_reason(&self) -> Option<&str> {
        match self {
            Self::Fetched(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProviderResult<U> {
        match self {
            Self::Fetched(v) => ProviderResult::Fetched(f(v)),
            Self::Unavailable { reason } => ProviderResult::Unavailable { reason },
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ProviderResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Fetched(v),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }
}

/// Every data domain the orchestrator can fan out to, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Route,
    Fires,
    Weather,
    FirstNations,
    Employers,
    WaterSources,
    PoiFireDepartment,
    PoiHospital,
    PoiRcmp,
    PoiGrocery,
    PoiHotel,
    RoadEvents,
    CommunityOps,
    EvacuationAlerts,
}

impl Domain {
    /// Domains fetched for every briefing, whether or not an origin is given.
    pub const ALWAYS: [Domain; 13] = [
        Domain::Fires,
        Domain::Weather,
        Domain::FirstNations,
        Domain::Employers,
        Domain::WaterSources,
        Domain::PoiFireDepartment,
        Domain::PoiHospital,
        Domain::PoiRcmp,
        Domain::PoiGrocery,
        Domain::PoiHotel,
        Domain::RoadEvents,
        Domain::CommunityOps,
        Domain::EvacuationAlerts,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Route => "route",
            Domain::Fires => "fires",
            Domain::Weather => "weather",
            Domain::FirstNations => "first_nations",
            Domain::Employers => "employers",
            Domain::WaterSources => "water_sources",
            Domain::PoiFireDepartment => "poi_fire_department",
            Domain::PoiHospital => "poi_hospital",
            Domain::PoiRcmp => "poi_rcmp",
            Domain::PoiGrocery => "poi_grocery",
            Domain::PoiHotel => "poi_hotel",
            Domain::RoadEvents => "road_events",
            Domain::CommunityOps => "community_ops",
            Domain::EvacuationAlerts => "evacuation_alerts",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage entry: did this domain contribute to the briefing?
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStatus {
    pub domain: Domain,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DomainStatus {
    pub fn from_result<T>(domain: Domain, result: &ProviderResult<T>) -> Self {
        Self {
            domain,
            ok: result.ok(),
            reason: result.failed_reason().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetched_exposes_value() {
        let r = ProviderResult::Fetched(3);
        assert!(r.ok());
        assert_eq!(r.value(), Some(&3));
        assert_eq!(r.failed_reason(), None);
        assert_eq!(r.map(|v| v * 2).into_value(), Some(6));
    }

    #[test]
    fn unavailable_carries_reason() {
        let r: ProviderResult<u8> = ProviderResult::unavailable("timed out after 5s");
        assert!(!r.ok());
        assert_eq!(r.value(), None);
        assert_eq!(r.failed_reason(), Some("timed out after 5s"));
        let status = DomainStatus::from_result(Domain::Weather, &r);
        assert!(!status.ok);
        assert_eq!(status.reason.as_deref(), Some("timed out after 5s"));
    }

    #[test]
    fn result_conversion() {
        let ok: ProviderResult<u8> = Ok::<u8, String>(1).into();
        assert!(ok.ok());
        let err: ProviderResult<u8> = Err::<u8, String>("boom".to_string()).into();
        assert_eq!(err.failed_reason(), Some("boom"));
    }

    #[test]
    fn domain_names_are_unique() {
        let mut names: Vec<&str> = Domain::ALWAYS.iter().map(|d| d.as_str()).collect();
        names.push(Domain::Route.as_str());
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
