//! Hover data attached to display nodes

use serde::ser::Serializer;
use serde::Serialize;
use std::collections::BTreeMap;

/// Strip the leading `n` characters profile ids carry (`n12` shows as `12`)
pub fn normalize_id(id: &str) -> &str {
    id.trim_start_matches('n')
}

/// A table of per-worker values plus a list of key/value facts
///
/// Each row holds at most one cell per column; workers that reported
/// nothing are skipped, so rows can be shorter than `column_names`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributes {
    pub column_names: Vec<String>,
    pub rows: BTreeMap<String, Vec<String>>,
    /// Facts in insertion order
    #[serde(serialize_with = "ordered_map")]
    pub kv: Vec<(String, String)>,
}

impl Attributes {
    pub fn new(column_names: Vec<String>) -> Self {
        Self {
            column_names,
            ..Self::default()
        }
    }

    pub fn add_row(&mut self, name: impl Into<String>, cells: Vec<String>) {
        self.rows.insert(name.into(), cells);
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.kv.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.kv.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.kv
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn row(&self, name: &str) -> Option<&[String]> {
        self.rows.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.kv.is_empty()
    }
}

fn ordered_map<S: Serializer>(kv: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(kv.iter().map(|(k, v)| (k, v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("n12"), "12");
        assert_eq!(normalize_id("nn3"), "3");
        assert_eq!(normalize_id("a1"), "a1");
        assert_eq!(normalize_id("n"), "");
    }

    #[test]
    fn test_kv_keeps_insertion_order() {
        let mut a = Attributes::new(vec!["0".to_string()]);
        a.set("id", "n4");
        a.set("operation", "map");
        a.set("id", "n5");
        assert_eq!(a.get("id"), Some("n5"));
        assert_eq!(a.kv[1].0, "operation");

        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(
            json,
            r#"{"column_names":["0"],"rows":{},"kv":{"id":"n5","operation":"map"}}"#
        );
    }
}
