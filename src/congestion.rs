use crate::node::Node;

pub const LIVE_SUB_PPLTN: &str = "LIVE_SUB_PPLTN";

pub const BOARDING_MIN: &str = "SUB_10WTHN_GTON_PPLTN_MIN";
pub const BOARDING_MAX: &str = "SUB_10WTHN_GTON_PPLTN_MAX";
pub const ALIGHTING_MIN: &str = "SUB_10WTHN_GTOFF_PPLTN_MIN";
pub const ALIGHTING_MAX: &str = "SUB_10WTHN_GTOFF_PPLTN_MAX";

pub const COUNT_FIELDS: [&str; 4] = [BOARDING_MIN, BOARDING_MAX, ALIGHTING_MIN, ALIGHTING_MAX];

/// Mean of the four ten-minute boarding/alighting estimates, rounded down.
pub fn average_congestion(population: Node) -> u32 {
    let population = population
        .unwrap_wrapped(LIVE_SUB_PPLTN)
        .unwrap_singleton_array();

    if !population.is_object() {
        debug!("No {} record ({:?}), congestion is 0", LIVE_SUB_PPLTN, population.shape());
        return 0;
    }

    let mut total: u64 = 0;
    for field in COUNT_FIELDS.iter() {
        match population.get(field).as_count() {
            Some(count) => total += count as u64,
            None => debug!("Unparseable {} ({:?}), counting 0", field, population.get(field).text_or_default()),
        }
    }

    return (total / COUNT_FIELDS.len() as u64) as u32;
}

#[cfg(test)]
mod tests {
    use super::average_congestion;
    use crate::node::Node;

    #[test]
    fn floor_average() {
        let v = serde_json::json!({
            "SUB_10WTHN_GTON_PPLTN_MIN": "10",
            "SUB_10WTHN_GTON_PPLTN_MAX": "20",
            "SUB_10WTHN_GTOFF_PPLTN_MIN": "5",
            "SUB_10WTHN_GTOFF_PPLTN_MAX": "13",
        });
        assert_eq!(12, average_congestion(Node::new(&v)));
    }

    #[test]
    fn wrapped_object() {
        let v = serde_json::json!({"LIVE_SUB_PPLTN": {
            "SUB_10WTHN_GTON_PPLTN_MIN": 100,
            "SUB_10WTHN_GTON_PPLTN_MAX": "200",
            "SUB_10WTHN_GTOFF_PPLTN_MIN": "50",
            "SUB_10WTHN_GTOFF_PPLTN_MAX": "75",
        }});
        assert_eq!(106, average_congestion(Node::new(&v)));
    }

    #[test]
    fn fields_default_independently() {
        let v = serde_json::json!({
            "SUB_10WTHN_GTON_PPLTN_MIN": "8",
            "SUB_10WTHN_GTON_PPLTN_MAX": "n/a",
        });
        assert_eq!(2, average_congestion(Node::new(&v)));
    }

    #[test]
    fn absent_is_zero() {
        assert_eq!(0, average_congestion(Node::absent()));
    }

    #[test]
    fn scalar_record_is_zero() {
        let v = serde_json::json!({"LIVE_SUB_PPLTN": "점검중"});
        assert_eq!(0, average_congestion(Node::new(&v)));
    }
}
