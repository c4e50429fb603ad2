//! Human-readable duration and distance text for route summaries.

/// Render seconds as `"<H> hours <M> mins"`.
///
/// The hour part is dropped when zero and the minute part is dropped when
/// zero, but never both: zero renders as `"0 mins"`. Leftover seconds are
/// truncated.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    match (hours, minutes) {
        (0, m) => format!("{m} mins"),
        (h, 0) => format!("{h} hours"),
        (h, m) => format!("{h} hours {m} mins"),
    }
}

/// Render metres as kilometres.
///
/// Below 1 km the value stays in metres; from 1000 km up it collapses to
/// thousands of kilometres (`"1.2k km"`).
#[must_use]
pub fn format_distance(meters: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let km = meters as f64 / 1000.0;
    if meters < 1000 {
        format!("{meters} m")
    } else if km < 1000.0 {
        format!("{km:.1} km")
    } else {
        format!("{:.1}k km", km / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_zero_mins() {
        assert_eq!(format_duration(0), "0 mins");
    }

    #[test]
    fn whole_hours_drop_minutes() {
        assert_eq!(format_duration(3600), "1 hours");
        assert_eq!(format_duration(36_000), "10 hours");
    }

    #[test]
    fn hours_and_minutes() {
        assert_eq!(format_duration(5400), "1 hours 30 mins");
    }

    #[test]
    fn minutes_only() {
        assert_eq!(format_duration(1800), "30 mins");
        assert_eq!(format_duration(59), "0 mins");
    }

    #[test]
    fn distance_units() {
        assert_eq!(format_distance(850), "850 m");
        assert_eq!(format_distance(125_400), "125.4 km");
        assert_eq!(format_distance(999_949), "999.9 km");
        assert_eq!(format_distance(1_234_000), "1.2k km");
    }
}
