//! `POST /api/v1/briefings`: build one dispatch briefing.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use dispatch_core::{BriefingRecord, GeocodeCandidate};
use dispatch_engine::{AmbiguousField, BriefingError, BriefingOutcome, BriefingRequest};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{parse_body, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(super) enum BriefingData {
    Ready {
        briefing: Box<BriefingRecord>,
    },
    NeedsDisambiguation {
        field: AmbiguousField,
        query: String,
        candidates: Vec<GeocodeCandidate>,
    },
}

impl From<BriefingOutcome> for BriefingData {
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

pub(super) fn map_briefing_error(request_id: &str, error: BriefingError) -> ApiError {
    match error {
        BriefingError::InvalidRequest(message) => ApiError::new(request_id, "bad_request", message),
        BriefingError::LocationNotFound(community) => ApiError::new(
            request_id,
            "location_not_found",
            format!("could not locate '{community}'"),
        ),
    }
}

pub(super) async fn create_briefing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<BriefingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BriefingData>>, ApiError> {
    let request = parse_body(&req_id.0, body)?;
    let outcome = state
        .engine
        .build_briefing(&request)
        .await
        .map_err(|e| map_briefing_error(&req_id.0, e))?;
    Ok(ApiResponse::new(BriefingData::from(outcome), &req_id))
}
