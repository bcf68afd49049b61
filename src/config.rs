extern crate anyhow;
extern crate serde;
extern crate serde_json;
extern crate serde_with;

use anyhow::Context;
use serde_with::{serde_as, DurationSeconds};

pub const DEFAULT_BASE_URL: &str = "http://openapi.seoul.go.kr:8088/";
pub const DEFAULT_AREA: &str = "서울식물원·마곡나루역";
pub const DEFAULT_LINE_MARKER: &str = "9";

#[serde_as]
#[derive(Clone, Deserialize)]
pub struct Config {
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Point of interest name the citydata endpoint is queried with.
    #[serde(default = "default_area")]
    pub area: String,

    /// Substring of `SUB_STN_LINE` selecting the tracked line.
    #[serde(default = "default_line_marker")]
    pub line_marker: String,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: std::time::Duration,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_timeout")]
    pub timeout: std::time::Duration,

    /// Budget for the filtered document; the response body itself is
    /// streamed and not bounded.
    #[serde(default = "default_max_retained_bytes")]
    pub max_retained_bytes: u64,

    /// e.g. /sys/class/power_supply/battery/voltage_now
    #[serde(default)]
    pub battery_voltage_path: Option<String>,

    #[serde(default)]
    pub imu_i2c_bus: Option<u8>,

    /// BCM numbers of the red, green and blue legs of the status LED.
    #[serde(default)]
    pub led_gpio_pins: Option<[u8; 3]>,
}

fn default_base_url() -> String {
    return DEFAULT_BASE_URL.to_string();
}

fn default_area() -> String {
    return DEFAULT_AREA.to_string();
}

fn default_line_marker() -> String {
    return DEFAULT_LINE_MARKER.to_string();
}

fn default_refresh_interval() -> std::time::Duration {
    return std::time::Duration::from_secs(60);
}

fn default_timeout() -> std::time::Duration {
    return std::time::Duration::from_secs(15);
}

fn default_max_retained_bytes() -> u64 {
    return 32 * 1024;
}

#[cfg(test)]
impl Config {
    pub fn new(api_key: &str) -> Config {
        return Config{
            api_key: api_key.to_string(),
            base_url: default_base_url(),
            area: default_area(),
            line_marker: default_line_marker(),
            refresh_interval: default_refresh_interval(),
            timeout: default_timeout(),
            max_retained_bytes: default_max_retained_bytes(),
            battery_voltage_path: None,
            imu_i2c_bus: None,
            led_gpio_pins: None,
        };
    }
}

// Hand-written so the API key never ends up in a log file.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        return f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("area", &self.area)
            .field("line_marker", &self.line_marker)
            .field("refresh_interval", &self.refresh_interval)
            .field("timeout", &self.timeout)
            .field("max_retained_bytes", &self.max_retained_bytes)
            .field("battery_voltage_path", &self.battery_voltage_path)
            .field("imu_i2c_bus", &self.imu_i2c_bus)
            .field("led_gpio_pins", &self.led_gpio_pins)
            .finish();
    }
}

pub fn config_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Config> {
    let debug_path = path.as_ref().to_str().map(|x| x.to_string());
    let file = std::fs::File::open(path)
        .with_context(|| format!("Opening config from '{:?}'", debug_path))?;
    let reader = std::io::BufReader::new(file);
    let config: Config = serde_json::from_reader(reader)
        .with_context(|| format!("while parsing config"))?;

    if config.api_key.trim().is_empty() {
        anyhow::bail!("config has an empty api_key");
    }
    return Ok(config);
}
