use crate::node::Node;
use crate::structs::{WeatherSnapshot, SKY_STATUS_UNAVAILABLE};

pub const WEATHER_STTS: &str = "WEATHER_STTS";
pub const TEMP: &str = "TEMP";
pub const MIN_TEMP: &str = "MIN_TEMP";
pub const MAX_TEMP: &str = "MAX_TEMP";
pub const PCP_MSG: &str = "PCP_MSG";
pub const FCST24HOURS: &str = "FCST24HOURS";
pub const SKY_STTS: &str = "SKY_STTS";
pub const PM10: &str = "PM10";
pub const PM10_INDEX: &str = "PM10_INDEX";
pub const PM25: &str = "PM25";
pub const PM25_INDEX: &str = "PM25_INDEX";

pub const SCALAR_FIELDS: [&str; 8] = [TEMP, MIN_TEMP, MAX_TEMP, PCP_MSG, PM10, PM10_INDEX, PM25, PM25_INDEX];

/// `weather` is the raw `WEATHER_STTS` member: an object, or an array whose
/// first element is used.
pub fn normalize_weather(weather: Node) -> WeatherSnapshot {
    let weather = weather.unwrap_singleton_array();
    if !weather.is_object() {
        debug!("No weather record ({:?}), using defaults", weather.shape());
        return WeatherSnapshot::default();
    }

    return WeatherSnapshot{
        current_temp: weather.get(TEMP).text_or_default(),
        min_temp: weather.get(MIN_TEMP).text_or_default(),
        max_temp: weather.get(MAX_TEMP).text_or_default(),
        sky_status: sky_status(weather.get(FCST24HOURS)),
        precipitation_msg: weather.get(PCP_MSG).text_or_default(),
        pm10: weather.get(PM10).text_or_default(),
        pm10_index: weather.get(PM10_INDEX).text_or_default(),
        pm25: weather.get(PM25).text_or_default(),
        pm25_index: weather.get(PM25_INDEX).text_or_default(),
    };
}

fn sky_status(forecast: Node) -> String {
    if forecast.len() == 0 {
        return SKY_STATUS_UNAVAILABLE.to_string();
    }
    return forecast.index(0).get(SKY_STTS).text_or_default();
}
