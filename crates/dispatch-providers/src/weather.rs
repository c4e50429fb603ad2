//! Environment Canada city forecast feeds.
//!
//! A community is mapped to an EC city code through the static station
//! table, then the city's Atom feed is parsed into current conditions, up to
//! six forecast periods, and any active warnings.

use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use dispatch_core::reference::WeatherStation;
use dispatch_core::{
    AppConfig, Coordinate, ReferenceTables, Weather, WeatherCurrent, WeatherPeriod,
};

use crate::error::ProviderError;
use crate::http::{endpoint, HttpFetcher};

const MAX_PERIODS: usize = 6;
/// Nearest-station fallback only applies within this many degrees.
const MAX_STATION_DEGREES: f64 = 2.0;
const FORECAST_CATEGORY: &str = "Weather Forecasts";
const WARNING_WORDS: [&str; 4] = ["WARNING", "WATCH", "ADVISORY", "ALERT"];

static FEED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+-\s+Weather").expect("valid regex"));
static TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+(?:\.\d+)?)\s*°C").expect("valid regex"));
static HUMIDITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Humidity:\s*(\d+)\s*%").expect("valid regex"));
static PERIOD_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)(\s+night)?:")
        .expect("valid regex")
});
static HIGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)High\s+(minus\s+)?(\d+)").expect("valid regex"));
static LOW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Low\s+(minus\s+)?(\d+)").expect("valid regex"));
static POP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)POP\s+(\d+)%|(\d+)\s*percent\s+chance").expect("valid regex")
});

/// Station for `community`: exact city name, then a substring match either
/// way, then the nearest station to `near` within two degrees.
#[must_use]
pub fn find_station<'a>(
    tables: &'a ReferenceTables,
    community: &str,
    near: Option<Coordinate>,
) -> Option<&'a WeatherStation> {
    let stations = tables.weather_stations();
    let wanted = community.trim().to_lowercase();

    if !wanted.is_empty() {
        if let Some(s) = stations.iter().find(|s| s.city == wanted) {
            return Some(s);
        }
        if let Some(s) = stations
            .iter()
            .find(|s| s.city.contains(&wanted) || wanted.contains(&s.city))
        {
            return Some(s);
        }
    }

    let point = near?;
    stations
        .iter()
        .filter_map(|s| {
            let c = s.coordinate()?;
            let degrees = ((point.lat - c.lat).powi(2) + (point.lng - c.lng).powi(2)).sqrt();
            Some((s, degrees))
        })
        .filter(|(_, d)| *d < MAX_STATION_DEGREES)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| s)
}

#[derive(Debug, Default)]
struct Entry {
    title: String,
    summary: String,
    category: Option<String>,
}

/// Parse an EC city Atom feed.
///
/// # Errors
///
/// Returns [`ProviderError::Xml`] when the document is not well-formed.
pub fn parse_city_feed(xml: &str, station_code: &str) -> Result<Weather, ProviderError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut location = None;
    let mut entries = Vec::new();
    let mut entry: Option<Entry> = None;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "entry" {
                    entry = Some(Entry::default());
                }
                current_tag = name;
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"category" {
                    if let Some(entry) = entry.as_mut() {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"term" {
                                entry.category =
                                    Some(String::from_utf8_lossy(&attr.value).into_owned());
                            }
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"entry" {
                    if let Some(done) = entry.take() {
                        entries.push(done);
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().into_owned();
                match (entry.as_mut(), current_tag.as_str()) {
                    (Some(entry), "title") => entry.title = text,
                    (Some(entry), "summary") => entry.summary.push_str(&text),
                    (None, "title") if location.is_none() => {
                        location = FEED_TITLE
                            .captures(&text)
                            .and_then(|c| c.get(1))
                            .map(|m| m.as_str().trim().to_string());
                    }
                    _ => {}
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(entry), "summary") = (entry.as_mut(), current_tag.as_str()) {
                    entry
                        .summary
                        .push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ProviderError::Xml(e)),
            _ => {}
        }
    }

    let mut current = None;
    let mut forecast = Vec::new();
    let mut warnings = Vec::new();

    for entry in entries {
        let title = entry.title.trim();
        let upper = title.to_uppercase();
        if let Some(rest) = title.strip_prefix("Current Conditions:") {
            current = Some(parse_current(rest, &entry.summary));
        } else if WARNING_WORDS.iter().any(|w| upper.contains(w))
            && !upper.starts_with("NO WATCHES OR WARNINGS")
        {
            warnings.push(title.to_string());
        } else if entry.category.as_deref() == Some(FORECAST_CATEGORY) {
            if let Some(period) = parse_period(title, &entry.summary) {
                forecast.push(period);
            }
        }
    }
    forecast.truncate(MAX_PERIODS);

    Ok(Weather {
        location: location.unwrap_or_else(|| "Unknown".to_string()),
        station_code: station_code.to_string(),
        current,
        forecast,
        warnings,
    })
}

fn parse_current(title_rest: &str, summary_html: &str) -> WeatherCurrent {
    let lines = html_lines(summary_html);
    let labelled = |label: &str| {
        lines
            .iter()
            .find_map(|l| l.strip_prefix(label))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let joined = lines.join("\n");
    WeatherCurrent {
        temperature_c: TEMPERATURE
            .captures(title_rest)
            .and_then(|c| c[1].parse().ok()),
        condition: labelled("Condition:"),
        humidity_pct: HUMIDITY.captures(&joined).and_then(|c| c[1].parse().ok()),
        wind: labelled("Wind:"),
    }
}

fn parse_period(title: &str, summary_html: &str) -> Option<WeatherPeriod> {
    let caps = PERIOD_DAY.captures(title)?;
    let day = match caps.get(2) {
        Some(night) => format!("{}{}", &caps[1], night.as_str()),
        None => caps[1].to_string(),
    };
    let summary = title
        .split_once(':')
        .map_or(title, |(_, rest)| rest)
        .trim()
        .to_string();
    let summary_text = html_lines(summary_html).join(" ");
    let pop = pop_percent(&summary_text).or_else(|| pop_percent(title));
    Some(WeatherPeriod {
        day,
        summary,
        high: signed_temperature(&HIGH, title),
        low: signed_temperature(&LOW, title),
        pop,
    })
}

fn pop_percent(text: &str) -> Option<u8> {
    let caps = POP.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// `"High minus 4"` reads as -4.
fn signed_temperature(pattern: &Regex, text: &str) -> Option<i32> {
    let caps = pattern.captures(text)?;
    let value: i32 = caps[2].parse().ok()?;
    Some(if caps.get(1).is_some() { -value } else { value })
}

/// Strip tags, treating `<br>` as a line break, and return the non-empty
/// whitespace-collapsed lines.
pub(crate) fn html_lines(html: &str) -> Vec<String> {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let lowered = tag.trim_start_matches('/').to_ascii_lowercase();
                out.push(if lowered.starts_with("br") || lowered.starts_with('p') {
                    '\n'
                } else {
                    ' '
                });
            }
            _ if in_tag => tag.push(ch),
            _ => out.push(ch),
        }
    }
    out.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: HttpFetcher,
    base_url: String,
    tables: &'static ReferenceTables,
}

impl WeatherClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if the configured feed base is malformed.
    pub fn new(
        http: HttpFetcher,
        config: &AppConfig,
        tables: &'static ReferenceTables,
    ) -> Result<Self, ProviderError> {
        let base_url = config.endpoints.weather_base_url.trim_end_matches('/');
        endpoint(base_url)?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            tables,
        })
    }

    /// Forecast for `community`, using `near` to pick a station when the
    /// name is not in the table.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::NoWeatherStation`] when no station matches.
    /// - [`ProviderError::Http`] / [`ProviderError::Xml`] when the feed
    ///   cannot be fetched or parsed.
    pub async fn forecast(
        &self,
        community: &str,
        near: Option<Coordinate>,
    ) -> Result<Weather, ProviderError> {
        let station = find_station(self.tables, community, near)
            .ok_or_else(|| ProviderError::NoWeatherStation(community.to_string()))?;
        let url = endpoint(&format!("{}/{}_e.xml", self.base_url, station.code))?;
        let xml = self.http.get_text(&url, &[]).await?;
        let weather = parse_city_feed(&xml, &station.code)?;
        tracing::debug!(
            station = %station.code,
            periods = weather.forecast.len(),
            warnings = weather.warnings.len(),
            "weather feed parsed"
        );
        Ok(weather)
    }
}

#[cfg(test)]
#[path = "weather_test.rs"]
mod tests;
