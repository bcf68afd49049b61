// http://openapi.seoul.go.kr:8088/{KEY}/json/citydata/1/1/{AREA}
//
// One document per area, refreshed by the city roughly every five minutes.
// Only a handful of its fields reach the display; see `citydata_filter`.
extern crate reqwest;
extern crate serde_json;

use crate::config::Config;
use crate::congestion;
use crate::filter::{self, FieldFilter};
use crate::node::Node;
use crate::result;
use crate::structs::TelemetrySnapshot;
use crate::subway;
use crate::weather;

pub const CITYDATA: &str = "CITYDATA";
pub const AREA_NM: &str = "AREA_NM";

pub type OpenFn = fn(&str, std::time::Duration) -> result::SeoulDashResult<Box<dyn std::io::Read>>;

/// The paths of the citydata document the dashboard keeps. Subway and
/// population members appear either bare or wrapped under their own name, so
/// their filters accept both shapes.
pub fn citydata_filter() -> FieldFilter {
    let forecast = FieldFilter::first(FieldFilter::fields(&[weather::SKY_STTS]));
    let weather_record = FieldFilter::first(
        FieldFilter::fields(&weather::SCALAR_FIELDS).with(weather::FCST24HOURS, forecast));

    let detail = FieldFilter::fields(&[subway::SUB_DIR, subway::SUB_ROUTE_NM, subway::SUB_ARVTIME]);
    let station = FieldFilter::fields(&[subway::SUB_STN_LINE]).with(subway::SUB_DETAIL, detail);
    let stations = station.clone().with(subway::SUB_STTS, station);

    let counts = FieldFilter::fields(&congestion::COUNT_FIELDS);
    let population = counts.clone().with(congestion::LIVE_SUB_PPLTN, counts);

    let city = FieldFilter::fields(&[AREA_NM])
        .with(weather::WEATHER_STTS, weather_record)
        .with(subway::SUB_STTS, stations)
        .with(congestion::LIVE_SUB_PPLTN, population);

    return FieldFilter::fields(&[]).with(CITYDATA, city);
}

/// Assembles a snapshot from the raw document. Only a stream/parse failure or
/// a missing `CITYDATA` object is an error; every field below that falls back
/// to its default.
pub fn normalize_document<R: std::io::Read>(reader: R, config: &Config) -> result::SeoulDashResult<TelemetrySnapshot> {
    let document = filter::parse_filtered(reader, &citydata_filter(), config.max_retained_bytes)?;

    let city = Node::new(&document).get(CITYDATA);
    if !city.is_object() {
        return Err(result::SeoulDashError::MissingRoot(CITYDATA));
    }

    return Ok(TelemetrySnapshot{
        area_name: city.get(AREA_NM).text_or_default(),
        weather: weather::normalize_weather(city.get(weather::WEATHER_STTS)),
        subway: subway::extract_arrivals(city.get(subway::SUB_STTS), &config.line_marker),
        congestion: congestion::average_congestion(city.get(congestion::LIVE_SUB_PPLTN)),
        valid: true,
    });
}

pub fn citydata_url(config: &Config) -> result::SeoulDashResult<reqwest::Url> {
    let mut url = reqwest::Url::parse(&config.base_url)
        .map_err(|e| result::make_error(&format!("bad base url '{}': {}", config.base_url, e)))?;
    {
        let mut segments = url.path_segments_mut()
            .map_err(|_| result::make_error(&format!("base url '{}' cannot take a path", config.base_url)))?;
        segments.pop_if_empty()
            .extend(&[config.api_key.as_str(), "json", "citydata", "1", "1", config.area.as_str()]);
    }
    return Ok(url);
}

pub fn fetch_snapshot(config: &Config) -> result::SeoulDashResult<TelemetrySnapshot> {
    return fetch_snapshot_ext(config, real_open);
}

fn fetch_snapshot_ext(config: &Config, open_fn: OpenFn) -> result::SeoulDashResult<TelemetrySnapshot> {
    let url = citydata_url(config)?;
    debug!("Fetching citydata for '{}'", config.area);

    let body = open_fn(url.as_str(), config.timeout)?;
    let snapshot = normalize_document(body, config)?;

    debug!("Assembled snapshot for '{}': up={} down={} congestion={}",
           snapshot.area_name,
           snapshot.subway[0].count(),
           snapshot.subway[1].count(),
           snapshot.congestion);
    return Ok(snapshot);
}

fn real_open(url: &str, timeout: std::time::Duration) -> result::SeoulDashResult<Box<dyn std::io::Read>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(result::SeoulDashError::HttpStatus(response.status()));
    }
    return Ok(Box::new(response));
}

/// Last assembled snapshot. A failed attempt never touches a `Ready`
/// snapshot, and nothing goes back to `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub enum Telemetry {
    Pending,
    Ready(TelemetrySnapshot),
}

impl Telemetry {
    pub fn new() -> Telemetry {
        return Telemetry::Pending;
    }

    pub fn is_ready(&self) -> bool {
        match self {
            Telemetry::Pending => false,
            Telemetry::Ready(_) => true,
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        match self {
            Telemetry::Pending => TelemetrySnapshot::invalid(),
            Telemetry::Ready(snapshot) => snapshot.clone(),
        }
    }

    /// Hands the failure back so the caller can decide how to present it.
    pub fn update(&mut self, attempt: result::SeoulDashResult<TelemetrySnapshot>) -> result::SeoulDashResult<()> {
        let snapshot = attempt?;
        *self = Telemetry::Ready(snapshot);
        return Ok(());
    }
}
