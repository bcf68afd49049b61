use crate::node::Node;
use crate::structs::{ArrivalSlot, Direction, DirectionSnapshot, ServiceKind};

pub const SUB_STTS: &str = "SUB_STTS";
pub const SUB_STN_LINE: &str = "SUB_STN_LINE";
pub const SUB_DETAIL: &str = "SUB_DETAIL";
pub const SUB_DIR: &str = "SUB_DIR";
pub const SUB_ROUTE_NM: &str = "SUB_ROUTE_NM";
pub const SUB_ARVTIME: &str = "SUB_ARVTIME";

pub const EXPRESS_MARKER: &str = "급행";

pub fn classify_route(route_name: &str) -> ServiceKind {
    if route_name.contains(EXPRESS_MARKER) {
        return ServiceKind::Express;
    }
    return ServiceKind::Normal;
}

/// Arrivals on the line whose label contains `line_marker`, as `[up, down]`.
///
/// Every matching station replaces what earlier matching stations produced,
/// so with several matches the last one in the document wins.
pub fn extract_arrivals(stations: Node, line_marker: &str) -> [DirectionSnapshot; 2] {
    let mut result = [
        DirectionSnapshot::empty(Direction::Up),
        DirectionSnapshot::empty(Direction::Down),
    ];

    let stations = stations.unwrap_wrapped(SUB_STTS);
    if !stations.is_array() {
        debug!("No {} collection ({:?}), no arrivals", SUB_STTS, stations.shape());
    }
    for station in stations.elements() {
        let line = station.get(SUB_STN_LINE).text_or_default();
        if !line.contains(line_marker) {
            continue;
        }

        let details = station.get(SUB_DETAIL);
        for (snapshot, direction) in result.iter_mut().zip(Direction::ALL.iter()) {
            fill_direction(snapshot, *direction, details);
        }
    }

    return result;
}

fn fill_direction(snapshot: &mut DirectionSnapshot, direction: Direction, details: Node) {
    snapshot.clear();
    for detail in details.elements() {
        if snapshot.is_full() {
            break;
        }
        if detail.get(SUB_DIR).as_text().as_deref() != Some(direction.feed_label()) {
            continue;
        }

        let arrival_time = detail.get(SUB_ARVTIME);
        let total_seconds = match arrival_time.as_count() {
            Some(seconds) => seconds,
            None => {
                debug!("Unparseable {} ({:?}), treating as arriving now", SUB_ARVTIME, arrival_time.text_or_default());
                0
            },
        };
        let service = classify_route(&detail.get(SUB_ROUTE_NM).text_or_default());
        snapshot.push(ArrivalSlot::from_total_seconds(service, total_seconds));
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_route, extract_arrivals};
    use crate::node::Node;
    use crate::structs::{ArrivalSlot, ServiceKind};

    fn detail(dir: &str, route: &str, seconds: &str) -> serde_json::Value {
        return serde_json::json!({"SUB_DIR": dir, "SUB_ROUTE_NM": route, "SUB_ARVTIME": seconds});
    }

    #[test]
    fn express_marker_anywhere() {
        assert_eq!(ServiceKind::Express, classify_route("급행 개화행"));
        assert_eq!(ServiceKind::Express, classify_route("중앙보훈병원행 급행"));
        assert_eq!(ServiceKind::Express, classify_route("김포공항(급행)행"));
        assert_eq!(ServiceKind::Normal, classify_route("중앙보훈병원행"));
        assert_eq!(ServiceKind::Normal, classify_route(""));
    }

    #[test]
    fn caps_each_direction_at_two() {
        let doc = serde_json::json!([{
            "SUB_STN_LINE": "9호선",
            "SUB_DETAIL": [
                detail("상행", "개화행", "60"),
                detail("하행", "급행 중앙보훈병원행", "125"),
                detail("상행", "급행 개화행", "240"),
                detail("상행", "개화행", "600"),
            ],
        }]);

        let [up, down] = extract_arrivals(Node::new(&doc), "9");
        assert_eq!(2, up.count());
        assert_eq!(&[
            ArrivalSlot{service: ServiceKind::Normal, minutes: 1, seconds: 0},
            ArrivalSlot{service: ServiceKind::Express, minutes: 4, seconds: 0},
        ], up.arrivals());
        assert_eq!(1, down.count());
        assert_eq!(ArrivalSlot{service: ServiceKind::Express, minutes: 2, seconds: 5}, down.arrivals()[0]);
    }

    #[test]
    fn skips_other_lines() {
        let doc = serde_json::json!([{
            "SUB_STN_LINE": "5호선",
            "SUB_DETAIL": [detail("상행", "방화행", "60")],
        }]);
        let [up, down] = extract_arrivals(Node::new(&doc), "9");
        assert_eq!(0, up.count());
        assert_eq!(0, down.count());
    }

    #[test]
    fn unwraps_nested_collection() {
        let doc = serde_json::json!({"SUB_STTS": [{
            "SUB_STN_LINE": "9",
            "SUB_DETAIL": [detail("하행", "중앙보훈병원행", "30")],
        }]});
        let [_, down] = extract_arrivals(Node::new(&doc), "9");
        assert_eq!(1, down.count());
        assert_eq!(30, down.arrivals()[0].seconds);
    }

    #[test]
    fn unparseable_time_still_counts() {
        let doc = serde_json::json!([{
            "SUB_STN_LINE": "9호선",
            "SUB_DETAIL": [
                detail("상행", "개화행", "곧 도착"),
                {"SUB_DIR": "상행"},
            ],
        }]);
        let [up, _] = extract_arrivals(Node::new(&doc), "9");
        assert_eq!(2, up.count());
        assert_eq!(ArrivalSlot{service: ServiceKind::Normal, minutes: 0, seconds: 0}, up.arrivals()[0]);
        assert_eq!(ArrivalSlot{service: ServiceKind::Normal, minutes: 0, seconds: 0}, up.arrivals()[1]);
    }

    #[test]
    fn direction_label_must_match_exactly() {
        let doc = serde_json::json!([{
            "SUB_STN_LINE": "9호선",
            "SUB_DETAIL": [detail("상행선", "개화행", "60"), detail(" 하행", "개화행", "60")],
        }]);
        let [up, down] = extract_arrivals(Node::new(&doc), "9");
        assert_eq!(0, up.count());
        assert_eq!(0, down.count());
    }

    #[test]
    fn last_matching_station_wins() {
        let doc = serde_json::json!([
            {
                "SUB_STN_LINE": "9호선",
                "SUB_DETAIL": [detail("상행", "급행 개화행", "60"), detail("하행", "중앙보훈병원행", "90")],
            },
            {
                "SUB_STN_LINE": "공항철도",
                "SUB_DETAIL": [detail("상행", "서울역행", "10")],
            },
            {
                "SUB_STN_LINE": "9호선(급행)",
                "SUB_DETAIL": [detail("상행", "개화행", "185")],
            },
        ]);
        let [up, down] = extract_arrivals(Node::new(&doc), "9");
        assert_eq!(&[ArrivalSlot{service: ServiceKind::Normal, minutes: 3, seconds: 5}], up.arrivals());
        assert_eq!(0, down.count());
    }

    #[test]
    fn missing_collection_is_empty() {
        let [up, down] = extract_arrivals(Node::absent(), "9");
        assert_eq!(0, up.count());
        assert_eq!(0, down.count());
    }
}
