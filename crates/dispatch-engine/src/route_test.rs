use super::*;

use dispatch_core::AppConfig;
use dispatch_providers::HttpFetcher;

fn at(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn victoria() -> Coordinate {
    at(48.4284, -123.3656)
}

fn nanaimo() -> Coordinate {
    at(49.1659, -123.9401)
}

fn kamloops() -> Coordinate {
    at(50.6745, -120.3273)
}

fn segment(duration_seconds: u64, lat: f64, lng: f64, instruction: &str) -> RouteSegment {
    RouteSegment {
        duration_seconds,
        end: at(lat, lng),
        instruction: instruction.to_string(),
    }
}

fn leg(duration_seconds: u64, segments: Vec<RouteSegment>) -> DriveLeg {
    DriveLeg {
        distance_meters: 420_000,
        duration_seconds,
        start_address: None,
        end_address: None,
        path: Vec::new(),
        segments,
        source: RouteSource::Directions,
    }
}

#[test]
fn ferry_detection_is_symmetric() {
    assert!(crosses_ferry(victoria(), kamloops()));
    assert!(crosses_ferry(kamloops(), victoria()));
    assert!(!crosses_ferry(victoria(), nanaimo()));
    assert!(!crosses_ferry(kamloops(), at(49.2827, -123.1207)));
}

#[test]
fn ferry_adds_buffer_and_note() {
    let est = assemble_estimate(victoria(), kamloops(), leg(5 * 3600, vec![]), None, None);
    assert!(est.ferry_crossing);
    assert_eq!(est.adjusted_duration_seconds, 5 * 3600 + FERRY_BUFFER_SECS);
    assert_eq!(est.ferry_note.as_deref(), Some(FERRY_NOTE));
    assert_eq!(est.adjusted_duration_text, "7 hours");

    let same_side = assemble_estimate(kamloops(), at(49.88, -119.49), leg(5400, vec![]), None, None);
    assert!(!same_side.ferry_crossing);
    assert_eq!(same_side.adjusted_duration_seconds, same_side.duration_seconds);
    assert!(same_side.ferry_note.is_none());
    assert_eq!(same_side.duration_text, "1 hours 30 mins");
}

#[test]
fn overnight_threshold_is_strict() {
    let exactly = assemble_estimate(kamloops(), kamloops(), leg(36_000, vec![]), None, None);
    assert!(!exactly.needs_overnight);
    let over = assemble_estimate(kamloops(), kamloops(), leg(36_001, vec![]), None, None);
    assert!(over.needs_overnight);
    assert!(over.overnight_point.is_none(), "no segments, no point");
}

#[test]
fn ferry_buffer_can_trigger_overnight() {
    let est = assemble_estimate(victoria(), kamloops(), leg(9 * 3600, vec![]), None, None);
    assert_eq!(est.duration_seconds, 9 * 3600);
    assert!(est.needs_overnight);
}

#[test]
fn overnight_point_is_end_of_crossing_segment() {
    let segments = vec![
        segment(20_000, 51.0, -121.0, "Head north on <b>BC-97</b>"),
        segment(10_000, 52.0, -122.0, "Continue"),
        segment(20_000, 53.9, -122.7, "Continue toward <b>Prince George</b>"),
    ];
    let point = find_overnight_point(&segments, OVERNIGHT_THRESHOLD_SECS).unwrap();
    assert_eq!(point.coordinate, at(53.9, -122.7));
    assert_eq!(point.location_name, "Prince George");
    assert_eq!(point.suggested_stop, "After approximately 10 hours of driving");

    let est = assemble_estimate(kamloops(), at(53.9, -122.7), leg(50_000, segments), None, None);
    assert!(est.overnight_point.is_some());
}

#[test]
fn overnight_point_accepts_exact_cumulative_match() {
    let segments = vec![
        segment(30_000, 51.0, -121.0, "Merge onto <b>BC-5 N</b>"),
        segment(6_000, 52.0, -122.0, "Take exit via <b>Cache Creek</b>"),
        segment(9_000, 53.0, -123.0, "Continue"),
    ];
    let point = find_overnight_point(&segments, 36_000).unwrap();
    assert_eq!(point.location_name, "Cache Creek");
}

#[test]
fn location_name_extraction() {
    let end = at(50.1234, -122.9567);
    assert_eq!(extract_location_name("Merge onto <b>BC-1 E</b>", end), "BC-1 E");
    assert_eq!(
        extract_location_name(
            "Turn right onto <b>Main St</b><div style=\"font-size:0.9em\">Destination on the left</div>",
            end
        ),
        "Main St"
    );
    assert_eq!(extract_location_name("Continue TOWARD Hope", end), "Hope");
    assert_eq!(extract_location_name("Turn left", end), "50.12, -122.96");
    assert_eq!(extract_location_name("", end), "50.12, -122.96");
}

#[test]
fn great_circle_leg_inflates_distance() {
    let vancouver = at(49.2827, -123.1207);
    let straight = haversine_km(vancouver, kamloops());
    let est = great_circle_leg(vancouver, kamloops());
    assert_eq!(est.source, RouteSource::Estimated);
    assert!(est.segments.is_empty());
    #[allow(clippy::cast_precision_loss)]
    let km = est.distance_meters as f64 / 1000.0;
    assert!((km - straight * 1.4).abs() < 0.01);
    #[allow(clippy::cast_precision_loss)]
    let hours = est.duration_seconds as f64 / 3600.0;
    assert!((hours - km / 80.0).abs() < 0.01);
}

#[test]
fn adjusted_never_below_raw_duration() {
    let points = [victoria(), nanaimo(), kamloops(), at(53.25, -132.07), at(58.8, -122.7)];
    for a in points {
        for b in points {
            let est = assemble_estimate(a, b, great_circle_leg(a, b), None, None);
            assert!(est.adjusted_duration_seconds >= est.duration_seconds);
            assert_eq!(
                est.adjusted_duration_seconds == est.duration_seconds,
                !est.ferry_crossing
            );
            assert_eq!(
                est.ferry_crossing,
                assemble_estimate(b, a, great_circle_leg(b, a), None, None).ferry_crossing
            );
        }
    }
}

#[tokio::test]
async fn compute_without_key_falls_back_to_estimate() {
    let config = AppConfig::default();
    let http = HttpFetcher::new(&config).unwrap();
    let computer = RouteComputer::new(
        DirectionsClient::new(http, &config).unwrap(),
        Duration::from_secs(1),
    );
    let est = computer
        .compute(victoria(), kamloops(), Some("Victoria"), Some("Kamloops"))
        .await;
    assert_eq!(est.source, RouteSource::Estimated);
    assert!(est.ferry_crossing);
    assert_eq!(est.origin_label.as_deref(), Some("Victoria"));
    assert_eq!(est.destination_label.as_deref(), Some("Kamloops"));
}
