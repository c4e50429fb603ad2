//! `POST /api/v1/routes`: drive estimate between two known points.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use dispatch_core::{Coordinate, RouteEstimate};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{parse_body, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct RoutePoint {
    lat: f64,
    lng: f64,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RouteRequest {
    origin: RoutePoint,
    destination: RoutePoint,
}

fn coordinate(request_id: &str, field: &str, point: &RoutePoint) -> Result<Coordinate, ApiError> {
    Coordinate::new(point.lat, point.lng)
        .map_err(|e| ApiError::new(request_id, "bad_request", format!("{field}: {e}")))
}

pub(super) async fn estimate_route(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RouteEstimate>>, ApiError> {
    let request = parse_body(&req_id.0, body)?;
    let origin = coordinate(&req_id.0, "origin", &request.origin)?;
    let destination = coordinate(&req_id.0, "destination", &request.destination)?;

    let estimate = state
        .engine
        .route_computer()
        .compute(
            origin,
            destination,
            request.origin.label.as_deref(),
            request.destination.label.as_deref(),
        )
        .await;
    Ok(ApiResponse::new(estimate, &req_id))
}
