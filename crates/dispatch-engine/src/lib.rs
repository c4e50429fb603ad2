//! Route computation and briefing aggregation.

pub mod builder;
pub mod orchestrator;
pub mod route;

pub use builder::{build, split_fires, BriefingParts};
pub use orchestrator::{
    AmbiguousField, BriefingEngine, BriefingOutcome, BriefingRequest, OriginInput,
};
pub use route::{RouteComputer, FERRY_BUFFER_SECS, OVERNIGHT_THRESHOLD_SECS};

use thiserror::Error;

/// Failures of a whole briefing request. Provider failures never appear
/// here; they only empty their section of the record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BriefingError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The destination could not be geocoded by any source.
    #[error("location not found: {0}")]
    LocationNotFound(String),
}
