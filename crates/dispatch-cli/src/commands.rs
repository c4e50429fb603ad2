use dispatch_core::{BriefingRecord, Coordinate, GeocodeCandidate};
use dispatch_engine::{
    AmbiguousField, BriefingEngine, BriefingOutcome, BriefingRequest, OriginInput,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum BriefingOutput {
    Ready {
        briefing: Box<BriefingRecord>,
    },
    NeedsDisambiguation {
        field: AmbiguousField,
        query: String,
        candidates: Vec<GeocodeCandidate>,
    },
}

impl From<BriefingOutcome> for BriefingOutput {
    fn from(outcome: BriefingOutcome) -> Self {
        match outcome {
            BriefingOutcome::Ready(briefing) => Self::Ready { briefing },
            BriefingOutcome::NeedsDisambiguation {
                field,
                disambiguation,
            } => Self::NeedsDisambiguation {
                field,
                query: disambiguation.query().to_string(),
                candidates: disambiguation.candidates().to_vec(),
            },
        }
    }
}

pub(crate) fn briefing_request(
    community: String,
    fire_number: Option<String>,
    origin: Option<String>,
    origin_coords: Option<Coordinate>,
) -> BriefingRequest {
    let origin = match (origin, origin_coords) {
        (_, Some(point)) => Some(OriginInput::Point {
            lat: point.lat,
            lng: point.lng,
            label: None,
        }),
        (Some(place), None) => Some(OriginInput::Place(place)),
        (None, None) => None,
    };
    BriefingRequest {
        community,
        fire_number,
        origin,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run_briefing(
    engine: &BriefingEngine,
    request: &BriefingRequest,
) -> anyhow::Result<()> {
    let outcome = engine.build_briefing(request).await?;
    if let BriefingOutcome::NeedsDisambiguation { field, .. } = &outcome {
        tracing::warn!(field = ?field, "briefing needs disambiguation; re-run with coordinates");
    }
    print_json(&BriefingOutput::from(outcome))
}

pub(crate) async fn run_geocode(engine: &BriefingEngine, query: &str) -> anyhow::Result<()> {
    let result = engine.providers().geocoder.resolve(query).await?;
    print_json(&result)
}

pub(crate) async fn run_route(
    engine: &BriefingEngine,
    from: Coordinate,
    to: Coordinate,
) -> anyhow::Result<()> {
    let estimate = engine.route_computer().compute(from, to, None, None).await;
    print_json(&estimate)
}
