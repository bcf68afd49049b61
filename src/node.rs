// Read-only, shape-tolerant view over a parsed JSON tree.
//
// The open data feed is loosely typed: the same field shows up as an object,
// a one-element array, or an object wrapping itself under its own name, and
// numbers arrive as either JSON numbers or strings. Every accessor here
// collapses a missing or mismatched value into an absent node or a typed
// default instead of failing.
extern crate serde_json;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Object,
    Array,
    Scalar,
    Absent,
}

#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    value: Option<&'a Value>,
}

impl<'a> Node<'a> {
    pub fn new(value: &'a Value) -> Node<'a> {
        return Node{ value: Some(value) };
    }

    pub fn absent() -> Node<'a> {
        return Node{ value: None };
    }

    pub fn shape(&self) -> Shape {
        match self.value {
            None | Some(Value::Null) => Shape::Absent,
            Some(Value::Object(_)) => Shape::Object,
            Some(Value::Array(_)) => Shape::Array,
            Some(_) => Shape::Scalar,
        }
    }

    pub fn is_object(&self) -> bool {
        return self.shape() == Shape::Object;
    }

    pub fn is_array(&self) -> bool {
        return self.shape() == Shape::Array;
    }

    pub fn is_absent(&self) -> bool {
        return self.shape() == Shape::Absent;
    }

    /// Member lookup. Anything but an object yields an absent node.
    pub fn get(&self, key: &str) -> Node<'a> {
        match self.value {
            Some(Value::Object(map)) => Node{ value: map.get(key) },
            _ => Node::absent(),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        return !self.get(key).is_absent();
    }

    pub fn index(&self, i: usize) -> Node<'a> {
        match self.value {
            Some(Value::Array(items)) => Node{ value: items.get(i) },
            _ => Node::absent(),
        }
    }

    /// Number of array elements; zero for every other shape.
    pub fn len(&self) -> usize {
        match self.value {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let items: &'a [Value] = match self.value {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };
        return items.iter().map(Node::new);
    }

    /// `[x, ...]` becomes `x`, `[]` becomes absent, anything else is
    /// returned untouched.
    pub fn unwrap_singleton_array(self) -> Node<'a> {
        if self.is_array() {
            return self.index(0);
        }
        return self;
    }

    /// `{key: x}` becomes `x` when the object carries `key`; anything else
    /// is returned untouched.
    pub fn unwrap_wrapped(self, key: &str) -> Node<'a> {
        if self.is_object() && self.has(key) {
            return self.get(key);
        }
        return self;
    }

    pub fn as_text(&self) -> Option<String> {
        match self.value {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text_or_default(&self) -> String {
        return self.as_text().unwrap_or_default();
    }

    /// Non-negative integer from a JSON number or a numeric string.
    pub fn as_count(&self) -> Option<u32> {
        match self.value {
            Some(Value::Number(n)) => n.as_u64().and_then(|v| std::convert::TryFrom::try_from(v).ok()),
            Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, Shape};

    fn doc(raw: &str) -> serde_json::Value {
        return serde_json::from_str(raw).expect("parse test json");
    }

    #[test]
    fn shapes() {
        let v = doc(r#"{"o": {}, "a": [], "s": "x", "n": 3, "z": null}"#);
        let root = Node::new(&v);
        assert_eq!(Shape::Object, root.get("o").shape());
        assert_eq!(Shape::Array, root.get("a").shape());
        assert_eq!(Shape::Scalar, root.get("s").shape());
        assert_eq!(Shape::Scalar, root.get("n").shape());
        assert_eq!(Shape::Absent, root.get("z").shape());
        assert_eq!(Shape::Absent, root.get("missing").shape());
        assert_eq!(Shape::Absent, root.get("s").get("deeper").shape());
    }

    #[test]
    fn singleton_unwrap() {
        let v = doc(r#"{"one": [{"k": 1}], "none": [], "bare": {"k": 2}}"#);
        let root = Node::new(&v);
        assert_eq!("1", root.get("one").unwrap_singleton_array().get("k").text_or_default());
        assert!(root.get("none").unwrap_singleton_array().is_absent());
        assert_eq!("2", root.get("bare").unwrap_singleton_array().get("k").text_or_default());
    }

    #[test]
    fn wrapped_unwrap() {
        let v = doc(r#"{"wrapped": {"W": [1, 2]}, "bare": [1, 2, 3]}"#);
        let root = Node::new(&v);
        assert_eq!(2, root.get("wrapped").unwrap_wrapped("W").len());
        assert_eq!(3, root.get("bare").unwrap_wrapped("W").len());
    }

    #[test]
    fn text_defaults() {
        let v = doc(r#"{"s": "25.1", "n": 7, "o": {}}"#);
        let root = Node::new(&v);
        assert_eq!("25.1", root.get("s").text_or_default());
        assert_eq!("7", root.get("n").text_or_default());
        assert_eq!("", root.get("o").text_or_default());
        assert_eq!("", root.get("missing").text_or_default());
    }

    #[test]
    fn counts() {
        let v = doc(r#"{"s": "125", "n": 30, "neg": "-4", "junk": "soon", "f": 1.5}"#);
        let root = Node::new(&v);
        assert_eq!(Some(125), root.get("s").as_count());
        assert_eq!(Some(30), root.get("n").as_count());
        assert_eq!(None, root.get("neg").as_count());
        assert_eq!(None, root.get("junk").as_count());
        assert_eq!(None, root.get("f").as_count());
        assert_eq!(None, root.get("missing").as_count());
    }
}
