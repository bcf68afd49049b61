extern crate chrono;
extern crate chrono_tz;

use crate::structs::{DirectionSnapshot, TelemetrySnapshot};

const LOADING: &str = "Loading data...";
const NO_ARRIVALS: &str = "no arrivals";
const COLUMN_WIDTH: usize = 28;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Screen contents as text lines, top to bottom. An invalid snapshot gets the
/// loading placeholder and nothing else.
pub fn generate_lines(data: &TelemetrySnapshot, now: &chrono::DateTime<chrono_tz::Tz>, line_label: &str) -> Vec<String> {
    use chrono::Datelike;

    if !data.valid {
        return vec![LOADING.to_string()];
    }

    let weekday = WEEKDAYS.get(now.weekday().num_days_from_sunday() as usize).unwrap_or(&"?");
    let mut lines = vec![];

    lines.push(format!("{}/{} {}  {}", now.month(), now.day(), weekday, now.format("%H:%M")));

    let weather = &data.weather;
    lines.push(format!("{}°C ({} / {})", weather.current_temp, weather.min_temp, weather.max_temp));
    lines.push(format!("Sky {} | {}", weather.sky_status, weather.precipitation_msg));
    lines.push(format!("PM10 {}({})  PM2.5 {}({})",
                       weather.pm10_index, weather.pm10, weather.pm25_index, weather.pm25));

    lines.push(format!("== {} / line {} ==", data.area_name, line_label));

    let up = direction_column(&data.subway[0]);
    let down = direction_column(&data.subway[1]);
    for i in 0..std::cmp::max(up.len(), down.len()) {
        let left = up.get(i).map(String::as_str).unwrap_or("");
        let right = down.get(i).map(String::as_str).unwrap_or("");
        lines.push(format!("{:<width$}{}", left, right, width = COLUMN_WIDTH).trim_end().to_string());
    }

    lines.push(format!("Station congestion: {} people (10 min)", data.congestion));

    return lines;
}

fn direction_column(snapshot: &DirectionSnapshot) -> Vec<String> {
    let mut column = vec![format!("[{}]", snapshot.direction())];
    if snapshot.arrivals().is_empty() {
        column.push(NO_ARRIVALS.to_string());
    }
    for arrival in snapshot.arrivals() {
        column.push(format!("{}: {}m {}s", arrival.service, arrival.minutes, arrival.seconds));
    }
    return column;
}
