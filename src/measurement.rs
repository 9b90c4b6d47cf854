//! Decoding raw profile entries into typed per-worker measurements
//!
//! Each raw entry is `[property, ...fields]`. The property name alone decides
//! how the fields are read:
//!
//! | Kind     | Properties                                                   | Fields            |
//! |----------|--------------------------------------------------------------|-------------------|
//! | Ratio    | `time%`, `merge reduction`                                   | `[[num, den]]`    |
//! | Number   | `total size`, `invocations`, `allocated bytes`, ...          | `[x]`             |
//! | Duration | `time`, `exchange wait time`, `merge backpressure wait`      | `[{secs, nanos}]` |
//! | Text     | `persistent_id`                                              | `[string]`        |
//!
//! Properties missing from the table are dropped without error.

use crate::error::{ProfileError, Result};
use crate::schema::JsonMeasurement;
use crate::value::PropertyValue;
use serde_json::Value;
use std::collections::BTreeMap;

/// Property holding the persistent operator id; present in every worker when set
pub const PERSISTENT_ID: &str = "persistent_id";

/// How the fields of a property are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Ratio,
    Number,
    Duration,
    Text,
}

/// Look up the decoding rule for a property name
pub fn property_kind(property: &str) -> Option<PropertyKind> {
    match property {
        "time%" | "merge reduction" => Some(PropertyKind::Ratio),
        "total size" | "invocations" | "allocated bytes" | "used bytes" | "shared bytes"
        | "batches" | "storage size" | "merging batches" | "merging size" | "allocations" => {
            Some(PropertyKind::Number)
        }
        "exchange wait time" | "merge backpressure wait" | "time" => Some(PropertyKind::Duration),
        PERSISTENT_ID => Some(PropertyKind::Text),
        _ => None,
    }
}

/// A named property paired with its decoded value
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub property: String,
    pub value: PropertyValue,
}

impl Measurement {
    /// Decode one raw entry
    ///
    /// # Returns
    ///
    /// `Ok(None)` for properties that are not recognized.
    ///
    /// # Errors
    ///
    /// Fails when the property name is not a string, or when a recognized
    /// property is missing a field or carries a field of the wrong type.
    pub fn decode(raw: &JsonMeasurement) -> Result<Option<Measurement>> {
        let property = raw
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| ProfileError::MalformedMeasurement {
                property: format!("{:?}", raw.first()),
                reason: "property name must be a string".to_string(),
            })?;

        let Some(kind) = property_kind(property) else {
            return Ok(None);
        };

        let field = raw.get(1).ok_or_else(|| malformed(property, "missing value"))?;
        let value = match kind {
            PropertyKind::Ratio => {
                let pair = field
                    .as_array()
                    .ok_or_else(|| malformed(property, "expected [numerator, denominator]"))?;
                PropertyValue::Ratio {
                    numerator: number_at(property, pair.first())?,
                    denominator: number_at(property, pair.get(1))?,
                }
            }
            PropertyKind::Number => PropertyValue::Number(number_at(property, Some(field))?),
            PropertyKind::Duration => PropertyValue::from_secs_nanos(
                number_at(property, field.get("secs"))?,
                number_at(property, field.get("nanos"))?,
            ),
            PropertyKind::Text => {
                let text = field
                    .as_str()
                    .ok_or_else(|| malformed(property, &format!("expected a string, got {field}")))?;
                PropertyValue::Text(text.to_string())
            }
        };

        Ok(Some(Measurement {
            property: property.to_string(),
            value,
        }))
    }
}

fn malformed(property: &str, reason: &str) -> ProfileError {
    ProfileError::MalformedMeasurement {
        property: property.to_string(),
        reason: reason.to_string(),
    }
}

fn number_at(property: &str, field: Option<&Value>) -> Result<f64> {
    match field {
        Some(v) => v
            .as_f64()
            .ok_or_else(|| malformed(property, &format!("expected a number, got {v}"))),
        None => Err(malformed(property, "missing numeric field")),
    }
}

/// Per-property, per-worker values of one node
///
/// Index `i` of a sequence is worker `i`; `None` means the worker reported
/// nothing for that property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    values: BTreeMap<String, Vec<Option<PropertyValue>>>,
}

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value a worker reported for a property
    pub fn add(&mut self, worker: usize, m: Measurement) {
        let seq = self.values.entry(m.property).or_default();
        if seq.len() <= worker {
            seq.resize(worker + 1, None);
        }
        seq[worker] = Some(m.value);
    }

    /// Extend every sequence to `workers` slots
    pub fn pad_to(&mut self, workers: usize) {
        for seq in self.values.values_mut() {
            if seq.len() < workers {
                seq.resize(workers, None);
            }
        }
    }

    /// Properties with at least one recorded sequence, in sorted order
    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Per-worker values for a property; empty when the property is absent
    pub fn get(&self, property: &str) -> &[Option<PropertyValue>] {
        self.values.get(property).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Numeric projections for a property, restricted to workers passing `keep`
    pub fn numeric_values<'a, F>(&'a self, property: &str, keep: F) -> impl Iterator<Item = f64> + 'a
    where
        F: Fn(usize) -> bool + 'a,
    {
        self.get(property)
            .iter()
            .enumerate()
            .filter(move |(worker, _)| keep(*worker))
            .filter_map(|(_, v)| v.as_ref().and_then(PropertyValue::numeric_value))
    }

    /// Sum of the numeric projections of one property for one worker
    pub fn mass(&self, property: &str, worker: usize) -> f64 {
        self.get(property)
            .get(worker)
            .and_then(|v| v.as_ref())
            .and_then(PropertyValue::numeric_value)
            .unwrap_or(0.0)
    }

    /// Fold another node's measurements into this one
    ///
    /// Properties only present in `other` are copied. Shared properties are
    /// merged worker by worker; a slot present on one side only keeps that
    /// value.
    ///
    /// # Errors
    ///
    /// Fails when two sequences for the same property have different lengths,
    /// or when two values cannot be merged.
    pub fn append(&mut self, other: &Measurements) -> Result<()> {
        for (property, incoming) in &other.values {
            match self.values.get_mut(property) {
                None => {
                    self.values.insert(property.clone(), incoming.clone());
                }
                Some(existing) => {
                    if existing.len() != incoming.len() {
                        return Err(ProfileError::LengthMismatch {
                            property: property.clone(),
                            expected: existing.len(),
                            actual: incoming.len(),
                        });
                    }
                    for (slot, value) in existing.iter_mut().zip(incoming) {
                        *slot = match (slot.take(), value) {
                            (Some(a), Some(b)) => Some(a.merge(b)?),
                            (Some(a), None) => Some(a),
                            (None, Some(b)) => Some(b.clone()),
                            (None, None) => None,
                        };
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: serde_json::Value) -> JsonMeasurement {
        v.as_array().unwrap().clone()
    }

    #[test]
    fn test_decode_each_kind() {
        let m = Measurement::decode(&raw(json!(["invocations", 5])))
            .unwrap()
            .unwrap();
        assert_eq!(m.value, PropertyValue::Number(5.0));

        let m = Measurement::decode(&raw(json!(["time%", [3, 12]])))
            .unwrap()
            .unwrap();
        assert_eq!(m.value.numeric_value(), Some(0.25));

        let m = Measurement::decode(&raw(json!(["time", {"secs": 1, "nanos": 250000000}])))
            .unwrap()
            .unwrap();
        assert_eq!(m.value, PropertyValue::Duration(1250.0));

        let m = Measurement::decode(&raw(json!(["persistent_id", "abc"])))
            .unwrap()
            .unwrap();
        assert_eq!(m.value, PropertyValue::Text("abc".to_string()));
    }

    #[test]
    fn test_unknown_property_is_dropped() {
        let m = Measurement::decode(&raw(json!(["future metric", 1, 2, 3]))).unwrap();
        assert!(m.is_none());
    }

    #[test]
    fn test_non_numeric_field_fails() {
        let err = Measurement::decode(&raw(json!(["invocations", "five"]))).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedMeasurement { .. }));

        let err = Measurement::decode(&raw(json!(["time", {"secs": 1}]))).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedMeasurement { .. }));

        let err = Measurement::decode(&raw(json!(["persistent_id", 7]))).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedMeasurement { .. }));
    }

    #[test]
    fn test_property_name_must_be_string() {
        assert!(Measurement::decode(&raw(json!([42, 1]))).is_err());
        assert!(Measurement::decode(&Vec::new()).is_err());
    }

    #[test]
    fn test_sparse_workers() {
        let mut ms = Measurements::new();
        ms.add(
            2,
            Measurement {
                property: "batches".to_string(),
                value: PropertyValue::Number(4.0),
            },
        );
        assert_eq!(ms.get("batches").len(), 3);
        assert!(ms.get("batches")[0].is_none());

        ms.pad_to(4);
        assert_eq!(ms.get("batches").len(), 4);
        assert_eq!(ms.numeric_values("batches", |_| true).collect::<Vec<_>>(), vec![4.0]);
        assert_eq!(ms.numeric_values("batches", |w| w != 2).count(), 0);
        assert!(ms.get("missing").is_empty());
    }

    #[test]
    fn test_append_merges_per_worker() {
        let mut a = Measurements::new();
        let mut b = Measurements::new();
        for (worker, x) in [(0, 1.0), (1, 2.0)] {
            a.add(
                worker,
                Measurement {
                    property: "invocations".to_string(),
                    value: PropertyValue::Number(x),
                },
            );
        }
        b.add(
            0,
            Measurement {
                property: "invocations".to_string(),
                value: PropertyValue::Number(10.0),
            },
        );
        b.add(
            0,
            Measurement {
                property: "allocations".to_string(),
                value: PropertyValue::Number(3.0),
            },
        );
        b.pad_to(2);

        a.append(&b).unwrap();
        assert_eq!(a.mass("invocations", 0), 11.0);
        assert_eq!(a.mass("invocations", 1), 2.0);
        assert_eq!(a.mass("allocations", 0), 3.0);
    }

    #[test]
    fn test_append_length_mismatch_fails() {
        let mut a = Measurements::new();
        let mut b = Measurements::new();
        a.add(
            0,
            Measurement {
                property: "batches".to_string(),
                value: PropertyValue::Number(1.0),
            },
        );
        b.add(
            3,
            Measurement {
                property: "batches".to_string(),
                value: PropertyValue::Number(1.0),
            },
        );
        assert!(matches!(
            a.append(&b),
            Err(ProfileError::LengthMismatch { expected: 1, actual: 4, .. })
        ));
    }
}
