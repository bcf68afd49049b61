// Streaming JSON parse that only materializes an allow-listed set of paths.
//
// The citydata document is tens of kilobytes, most of which the dashboard
// never shows. Skipped members are consumed with `IgnoredAny` straight off
// the byte stream, so peak memory is bounded by what the filter keeps, and
// that in turn is held to a byte budget.
extern crate serde;
extern crate serde_json;

use std::cell::Cell;
use std::collections::BTreeMap;

use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};

use crate::result;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Retain the whole subtree.
    Keep,
    /// Retain the listed members of an object. Applied to every element when
    /// the value turns out to be an array.
    Fields(BTreeMap<String, FieldFilter>),
    /// Retain only the first element of an array. A bare object is treated as
    /// that first element.
    First(Box<FieldFilter>),
}

static KEEP: FieldFilter = FieldFilter::Keep;

impl FieldFilter {
    pub fn fields(names: &[&str]) -> FieldFilter {
        return FieldFilter::Fields(
            names.iter().map(|n| (n.to_string(), FieldFilter::Keep)).collect());
    }

    pub fn first(inner: FieldFilter) -> FieldFilter {
        return FieldFilter::First(Box::new(inner));
    }

    /// Adds (or replaces) a member with its own sub-filter.
    pub fn with(self, name: &str, sub: FieldFilter) -> FieldFilter {
        let mut members = match self {
            FieldFilter::Fields(members) => members,
            _ => BTreeMap::new(),
        };
        members.insert(name.to_string(), sub);
        return FieldFilter::Fields(members);
    }

    fn child(&self, key: &str) -> Option<&FieldFilter> {
        match self {
            FieldFilter::Keep => Some(&KEEP),
            FieldFilter::Fields(members) => members.get(key),
            FieldFilter::First(inner) => inner.child(key),
        }
    }
}

// Rough cost of one retained value, on top of any string payload.
const SLOT_BYTES: u64 = 16;

struct Filtered<'f> {
    filter: &'f FieldFilter,
    budget: &'f Cell<u64>,
}

impl<'f> Filtered<'f> {
    fn to(&self, filter: &'f FieldFilter) -> Filtered<'f> {
        return Filtered{ filter: filter, budget: self.budget };
    }

    fn charge<E: serde::de::Error>(&self, payload: usize) -> Result<(), E> {
        let cost = SLOT_BYTES + payload as u64;
        if cost > self.budget.get() {
            return Err(E::custom("filtered document exceeds its byte budget"));
        }
        self.budget.set(self.budget.get() - cost);
        return Ok(());
    }

    fn scalar<E: serde::de::Error>(&self, value: Value, payload: usize) -> Result<Value, E> {
        // A scalar where the filter asked for a container is dropped.
        if *self.filter != FieldFilter::Keep {
            return Ok(Value::Null);
        }
        self.charge(payload)?;
        return Ok(value);
    }
}

impl<'de, 'f> DeserializeSeed<'de> for Filtered<'f> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        return deserializer.deserialize_any(self);
    }
}

impl<'de, 'f> Visitor<'de> for Filtered<'f> {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        return write!(f, "any JSON value");
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Value, E> {
        return self.scalar(Value::Bool(v), 0);
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Value, E> {
        return self.scalar(Value::from(v), 0);
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Value, E> {
        return self.scalar(Value::from(v), 0);
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Value, E> {
        return self.scalar(Value::from(v), 0);
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Value, E> {
        return self.scalar(Value::String(v.to_string()), v.len());
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Value, E> {
        return Ok(Value::Null);
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        self.charge::<A::Error>(0)?;
        let mut kept = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            match self.filter.child(&key) {
                Some(sub) => {
                    self.charge::<A::Error>(key.len())?;
                    let value = map.next_value_seed(self.to(sub))?;
                    kept.insert(key, value);
                },
                None => {
                    map.next_value::<IgnoredAny>()?;
                },
            }
        }
        return Ok(Value::Object(kept));
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        self.charge::<A::Error>(0)?;
        let mut kept = vec![];
        match self.filter {
            FieldFilter::First(inner) => {
                if let Some(value) = seq.next_element_seed(self.to(&**inner))? {
                    kept.push(value);
                }
                while seq.next_element::<IgnoredAny>()?.is_some() {}
            },
            _ => {
                while let Some(value) = seq.next_element_seed(self.to(self.filter))? {
                    kept.push(value);
                }
            },
        }
        return Ok(Value::Array(kept));
    }
}

/// Reads `reader` to the end. Only what `filter` retains counts against
/// `max_retained_bytes`; going over it is reported as a JSON data error.
pub fn parse_filtered<R: std::io::Read>(reader: R, filter: &FieldFilter, max_retained_bytes: u64) -> result::SeoulDashResult<Value> {
    let budget = Cell::new(max_retained_bytes);
    let mut deserializer = serde_json::Deserializer::from_reader(std::io::BufReader::new(reader));
    let value = Filtered{ filter: filter, budget: &budget }.deserialize(&mut deserializer)?;
    deserializer.end()?;
    debug!("Filtered document retained {} bytes", max_retained_bytes - budget.get());
    return Ok(value);
}
