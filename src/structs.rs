extern crate serde;

use serde::ser::{Serialize, SerializeStruct, Serializer};

pub const SKY_STATUS_UNAVAILABLE: &str = "UNAVAILABLE";

/// Arrivals kept per direction.
pub const ARRIVAL_CAPACITY: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current_temp: String,
    pub min_temp: String,
    pub max_temp: String,
    pub sky_status: String,
    pub precipitation_msg: String,
    pub pm10: String,
    pub pm10_index: String,
    pub pm25: String,
    pub pm25_index: String,
}

impl Default for WeatherSnapshot {
    fn default() -> WeatherSnapshot {
        return WeatherSnapshot{
            current_temp: "".to_string(),
            min_temp: "".to_string(),
            max_temp: "".to_string(),
            sky_status: SKY_STATUS_UNAVAILABLE.to_string(),
            precipitation_msg: "".to_string(),
            pm10: "".to_string(),
            pm10_index: "".to_string(),
            pm25: "".to_string(),
            pm25_index: "".to_string(),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Express,
    Normal,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ServiceKind::Express => write!(f, "express"),
            ServiceKind::Normal => write!(f, "normal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArrivalSlot {
    pub service: ServiceKind,
    pub minutes: u32,
    pub seconds: u32,
}

impl ArrivalSlot {
    pub fn from_total_seconds(service: ServiceKind, total: u32) -> ArrivalSlot {
        return ArrivalSlot{
            service: service,
            minutes: total / 60,
            seconds: total % 60,
        };
    }
}

impl Default for ArrivalSlot {
    fn default() -> ArrivalSlot {
        return ArrivalSlot::from_total_seconds(ServiceKind::Normal, 0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    /// Label the feed uses in `SUB_DIR`.
    pub fn feed_label(&self) -> &'static str {
        match self {
            Direction::Up => "상행",
            Direction::Down => "하행",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Up to `ARRIVAL_CAPACITY` arrivals for one direction. Slots past `count`
/// are never exposed.
#[derive(Debug, Clone, Copy)]
pub struct DirectionSnapshot {
    direction: Direction,
    slots: [ArrivalSlot; ARRIVAL_CAPACITY],
    count: usize,
}

impl DirectionSnapshot {
    pub fn empty(direction: Direction) -> DirectionSnapshot {
        return DirectionSnapshot{
            direction: direction,
            slots: [ArrivalSlot::default(); ARRIVAL_CAPACITY],
            count: 0,
        };
    }

    pub fn direction(&self) -> Direction {
        return self.direction;
    }

    pub fn count(&self) -> usize {
        return self.count;
    }

    pub fn is_full(&self) -> bool {
        return self.count >= ARRIVAL_CAPACITY;
    }

    pub fn arrivals(&self) -> &[ArrivalSlot] {
        return &self.slots[..self.count];
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Returns false, leaving the snapshot untouched, once full.
    pub fn push(&mut self, slot: ArrivalSlot) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[self.count] = slot;
        self.count += 1;
        return true;
    }
}

impl PartialEq for DirectionSnapshot {
    fn eq(&self, other: &DirectionSnapshot) -> bool {
        return self.direction == other.direction && self.arrivals() == other.arrivals();
    }
}

impl Serialize for DirectionSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DirectionSnapshot", 2)?;
        state.serialize_field("direction", &self.direction)?;
        state.serialize_field("arrivals", self.arrivals())?;
        return state.end();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub area_name: String,
    pub weather: WeatherSnapshot,
    /// Always `[up, down]`.
    pub subway: [DirectionSnapshot; 2],
    pub congestion: u32,
    pub valid: bool,
}

impl TelemetrySnapshot {
    /// What a renderer gets before the first successful fetch.
    pub fn invalid() -> TelemetrySnapshot {
        return TelemetrySnapshot{
            area_name: "".to_string(),
            weather: WeatherSnapshot::default(),
            subway: [
                DirectionSnapshot::empty(Direction::Up),
                DirectionSnapshot::empty(Direction::Down),
            ],
            congestion: 0,
            valid: false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{ArrivalSlot, Direction, DirectionSnapshot, ServiceKind, TelemetrySnapshot};

    #[test]
    fn arrival_slot_split() {
        assert_eq!(ArrivalSlot{service: ServiceKind::Normal, minutes: 2, seconds: 5},
                   ArrivalSlot::from_total_seconds(ServiceKind::Normal, 125));
        assert_eq!(ArrivalSlot{service: ServiceKind::Express, minutes: 0, seconds: 0},
                   ArrivalSlot::from_total_seconds(ServiceKind::Express, 0));
        assert_eq!(ArrivalSlot{service: ServiceKind::Normal, minutes: 1, seconds: 59},
                   ArrivalSlot::from_total_seconds(ServiceKind::Normal, 119));
    }

    #[test]
    fn direction_snapshot_caps_at_two() {
        let mut d = DirectionSnapshot::empty(Direction::Up);
        assert!(d.push(ArrivalSlot::from_total_seconds(ServiceKind::Normal, 60)));
        assert!(d.push(ArrivalSlot::from_total_seconds(ServiceKind::Express, 120)));
        assert!(!d.push(ArrivalSlot::from_total_seconds(ServiceKind::Normal, 180)));
        assert_eq!(2, d.count());
        assert_eq!(2, d.arrivals()[1].minutes);

        d.clear();
        assert_eq!(0, d.count());
        assert!(d.arrivals().is_empty());
    }

    #[test]
    fn stale_slots_do_not_affect_equality() {
        let mut used = DirectionSnapshot::empty(Direction::Down);
        used.push(ArrivalSlot::from_total_seconds(ServiceKind::Express, 300));
        used.clear();
        assert_eq!(DirectionSnapshot::empty(Direction::Down), used);
    }

    #[test]
    fn invalid_snapshot_serializes_without_arrivals() {
        let json = serde_json::to_value(&TelemetrySnapshot::invalid()).expect("to_value");
        assert_eq!(serde_json::json!(false), json["valid"]);
        assert_eq!(serde_json::json!("UNAVAILABLE"), json["weather"]["sky_status"]);
        assert_eq!(serde_json::json!({"direction": "up", "arrivals": []}), json["subway"][0]);
    }
}
