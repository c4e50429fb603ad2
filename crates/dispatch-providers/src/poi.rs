//! Points of interest by category with a tiered fallback:
//! destination search, nearby towns, regional district, provincial line.

use std::time::Duration;

use dispatch_core::{Confidence, Coordinate, PoiCategory, PoiEntry, ReferenceTables};

use crate::error::ProviderError;
use crate::places::{Place, PlacesClient};

const MAX_PER_CATEGORY: u32 = 3;
const BIAS_RADIUS_M: f64 = 50_000.0;
/// Only the first variations are tried against each nearby town.
const NEARBY_VARIATIONS: usize = 2;
/// Live tiers budget when none is configured; below the default provider timeout.
const DEFAULT_LIVE_BUDGET: Duration = Duration::from_secs(4);

const PROVINCIAL_NAME: &str = "BC Emergency Services";
const PROVINCIAL_ADDRESS: &str = "For emergencies dial 911. For non-emergency: 1-800-663-3456";

#[derive(Debug, Clone)]
pub struct PoiSearch {
    places: PlacesClient,
    tables: &'static ReferenceTables,
    live_budget: Duration,
}

fn to_entry(place: Place, confidence: Confidence, source: String) -> PoiEntry {
    PoiEntry {
        name: place.name,
        address: place.address,
        phone: place.phone,
        website: place.website,
        coordinate: place.coordinate,
        confidence,
        source,
    }
}

impl PoiSearch {
    #[must_use]
    pub fn new(places: PlacesClient, tables: &'static ReferenceTables) -> Self {
        Self {
            places,
            tables,
            live_budget: DEFAULT_LIVE_BUDGET,
        }
    }

    /// Cap on the time spent in the live search tiers. Keep it below the
    /// provider timeout so the fallback entry is still returned in time.
    #[must_use]
    pub fn with_live_budget(mut self, budget: Duration) -> Self {
        self.live_budget = budget;
        self
    }

    /// Up to three entries for `category` in `community`. Always returns at
    /// least one entry; the last tier is the provincial emergency line.
    ///
    /// # Errors
    ///
    /// Currently infallible; individual search failures fall through to the
    /// next tier, and live tiers that outlast the budget fall through to the
    /// static entry.
    pub async fn search(
        &self,
        community: &str,
        category: PoiCategory,
        near: Option<Coordinate>,
    ) -> Result<Vec<PoiEntry>, ProviderError> {
        if self.places.has_key() {
            let live = self.live_tiers(community, category, near);
            match tokio::time::timeout(self.live_budget, live).await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => {}
                Err(_) => tracing::warn!(
                    community,
                    category = category.as_str(),
                    budget_ms = u64::try_from(self.live_budget.as_millis()).unwrap_or(u64::MAX),
                    "poi live search over budget; using static contact"
                ),
            }
        }

        Ok(vec![self.fallback_entry(community)])
    }

    /// Destination search, then nearby towns. `None` when nothing matched.
    async fn live_tiers(
        &self,
        community: &str,
        category: PoiCategory,
        near: Option<Coordinate>,
    ) -> Option<Vec<PoiEntry>> {
        let variations = self.tables.poi_variations(category);

        for variation in variations {
            let query = format!("{community} {variation}, BC, Canada");
            let found = self.try_search(&query, near.map(|c| (c, BIAS_RADIUS_M))).await;
            if !found.is_empty() {
                return Some(
                    found
                        .into_iter()
                        .map(|p| to_entry(p, Confidence::High, "Google Places".to_string()))
                        .collect(),
                );
            }
        }

        for town in self.tables.nearby_towns(community) {
            for variation in variations.iter().take(NEARBY_VARIATIONS) {
                let query = format!("{town} {variation}, BC, Canada");
                let found = self.try_search(&query, None).await;
                if !found.is_empty() {
                    tracing::debug!(
                        community,
                        category = category.as_str(),
                        town = %town,
                        "poi found in nearby town"
                    );
                    return Some(
                        found
                            .into_iter()
                            .map(|p| to_entry(p, Confidence::Medium, format!("Nearby: {town}")))
                            .collect(),
                    );
                }
            }
        }
        None
    }

    async fn try_search(&self, query: &str, bias: Option<(Coordinate, f64)>) -> Vec<Place> {
        match self
            .places
            .search_text(query, bias, MAX_PER_CATEGORY)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(source = "places", query, error = %e, "poi search failed");
                Vec::new()
            }
        }
    }

    fn fallback_entry(&self, community: &str) -> PoiEntry {
        match self.tables.regional_contact(community) {
            Some(rd) => PoiEntry {
                name: format!("{} Emergency Services", rd.name),
                address: format!("Contact: {}", rd.phone),
                phone: Some(rd.phone.clone()),
                website: Some(rd.website.clone()),
                coordinate: None,
                confidence: Confidence::Fallback,
                source: "Regional District".to_string(),
            },
            None => PoiEntry {
                name: PROVINCIAL_NAME.to_string(),
                address: PROVINCIAL_ADDRESS.to_string(),
                phone: Some("911".to_string()),
                website: None,
                coordinate: None,
                confidence: Confidence::Fallback,
                source: "Provincial".to_string(),
            },
        }
    }
}
