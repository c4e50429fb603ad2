use super::*;

use dispatch_engine::OriginInput;

#[test]
fn parses_briefing_with_fire_number() {
    let cli = Cli::try_parse_from([
        "dispatch-cli",
        "briefing",
        "--community",
        "Kamloops",
        "--fire-number",
        "K20512",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Briefing {
            ref community,
            fire_number: Some(ref n),
            origin: None,
            origin_coords: None,
        } if community == "Kamloops" && n == "K20512"
    ));
}

#[test]
fn parses_origin_coords() {
    let cli = Cli::try_parse_from([
        "dispatch-cli",
        "briefing",
        "--community",
        "Kamloops",
        "--origin-coords",
        "49.2827, -123.1207",
    ])
    .expect("expected valid cli args");

    let Commands::Briefing {
        origin_coords: Some(point),
        ..
    } = cli.command
    else {
        panic!("expected origin coordinates");
    };
    assert!((point.lat - 49.2827).abs() < 1e-9);
    assert!((point.lng + 123.1207).abs() < 1e-9);
}

#[test]
fn origin_and_origin_coords_conflict() {
    let result = Cli::try_parse_from([
        "dispatch-cli",
        "briefing",
        "--community",
        "Kamloops",
        "--origin",
        "Vancouver",
        "--origin-coords",
        "49.28,-123.12",
    ]);
    assert!(result.is_err());
}

#[test]
fn briefing_requires_community() {
    assert!(Cli::try_parse_from(["dispatch-cli", "briefing"]).is_err());
}

#[test]
fn parses_geocode_query() {
    let cli = Cli::try_parse_from(["dispatch-cli", "geocode", "Deep Cove"]).unwrap();
    assert!(matches!(cli.command, Commands::Geocode { ref query } if query == "Deep Cove"));
}

#[test]
fn route_rejects_bad_coordinates() {
    assert!(Cli::try_parse_from([
        "dispatch-cli",
        "route",
        "--from",
        "95,-123",
        "--to",
        "50.67,-120.33"
    ])
    .is_err());
    assert!(Cli::try_parse_from([
        "dispatch-cli",
        "route",
        "--from",
        "49.28",
        "--to",
        "50.67,-120.33"
    ])
    .is_err());
}

#[test]
fn lat_lng_parser_reports_the_bad_part() {
    assert_eq!(
        parse_lat_lng("north,-120").unwrap_err(),
        "invalid latitude 'north'"
    );
    assert!(parse_lat_lng("50.67,-120.33").is_ok());
}

#[test]
fn coordinates_take_precedence_as_origin() {
    let point = Coordinate::new(49.28, -123.12).unwrap();
    let request = commands::briefing_request("Kamloops".to_string(), None, None, Some(point));
    assert!(matches!(
        request.origin,
        Some(OriginInput::Point { label: None, .. })
    ));

    let by_name =
        commands::briefing_request("Kamloops".to_string(), None, Some("Hope".to_string()), None);
    assert_eq!(by_name.origin, Some(OriginInput::Place("Hope".to_string())));
}
