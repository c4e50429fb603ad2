//! `POST /api/v1/geocode`: resolve free text to a place or a set of choices.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use dispatch_core::GeocodeResult;
use dispatch_providers::GeocodeError;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{parse_body, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeRequest {
    query: String,
}

pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<GeocodeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GeocodeResult>>, ApiError> {
    let request = parse_body(&req_id.0, body)?;
    let result = state
        .engine
        .providers()
        .geocoder
        .resolve(&request.query)
        .await
        .map_err(|e| match e {
            GeocodeError::EmptyQuery => ApiError::new(&req_id.0, "bad_request", e.to_string()),
            GeocodeError::NotFound(_) => {
                ApiError::new(&req_id.0, "location_not_found", e.to_string())
            }
        })?;
    Ok(ApiResponse::new(result, &req_id))
}
