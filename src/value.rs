//! Typed, mergeable measurement values
//!
//! A profile reports four kinds of measurements: plain numbers (counts and
//! sizes), ratios (fractions of a per-worker total), durations and text. All of
//! them can be summed with a value of the same kind, which is how the two
//! halves of a split operator are folded back together.
//!
//! # Ordering
//!
//! Values are totally ordered for display purposes:
//!
//! ```text
//! non-numeric  <  numeric          (a value with a projection sorts last)
//! numeric vs numeric               (compare projections)
//! Text vs Text                     (lexicographic)
//! non-numeric vs non-numeric       (equal)
//! ```
//!
//! # Example
//!
//! ```
//! use circuit_profiler::value::PropertyValue;
//!
//! # fn main() -> circuit_profiler::error::Result<()> {
//! let hold = PropertyValue::Number(5.0);
//! let output = PropertyValue::Number(7.0);
//! assert_eq!(hold.merge(&output)?, PropertyValue::Number(12.0));
//!
//! let share = PropertyValue::Ratio { numerator: 1.0, denominator: 8.0 };
//! assert_eq!(share.to_string(), "12.50");
//! # Ok(())
//! # }
//! ```

use crate::error::{ProfileError, Result};
use std::cmp::Ordering;
use std::fmt;

/// A decoded measurement value for one worker
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Count or size
    Number(f64),
    /// Fraction of a total; the projection is `numerator / denominator`
    Ratio { numerator: f64, denominator: f64 },
    /// Elapsed time in milliseconds
    Duration(f64),
    /// Opaque text (e.g. a persistent operator id)
    Text(String),
}

impl PropertyValue {
    /// Build a duration from a `{secs, nanos}` pair
    pub fn from_secs_nanos(secs: f64, nanos: f64) -> Self {
        PropertyValue::Duration(secs * 1000.0 + nanos / 1_000_000.0)
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Number(_) => "number",
            PropertyValue::Ratio { .. } => "ratio",
            PropertyValue::Duration(_) => "duration",
            PropertyValue::Text(_) => "text",
        }
    }

    /// Numeric projection of the value, if it has one
    ///
    /// A ratio with a zero denominator projects to 0.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(x) => Some(*x),
            PropertyValue::Ratio {
                numerator,
                denominator,
            } => {
                if *denominator == 0.0 {
                    Some(0.0)
                } else {
                    Some(numerator / denominator)
                }
            }
            PropertyValue::Duration(millis) => Some(*millis),
            PropertyValue::Text(_) => None,
        }
    }

    /// Raw string form: the text itself for `Text`, the rendering otherwise
    pub fn string_value(&self) -> String {
        match self {
            PropertyValue::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Sum two values of the same kind
    ///
    /// # Errors
    ///
    /// Fails when the kinds differ, or when two ratios have different
    /// denominators.
    pub fn merge(&self, other: &PropertyValue) -> Result<PropertyValue> {
        match (self, other) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => {
                Ok(PropertyValue::Number(a + b))
            }
            (
                PropertyValue::Ratio {
                    numerator: n1,
                    denominator: d1,
                },
                PropertyValue::Ratio {
                    numerator: n2,
                    denominator: d2,
                },
            ) => {
                if d1 != d2 {
                    return Err(ProfileError::DenominatorMismatch {
                        left: *d1,
                        right: *d2,
                    });
                }
                Ok(PropertyValue::Ratio {
                    numerator: n1 + n2,
                    denominator: *d1,
                })
            }
            (PropertyValue::Duration(a), PropertyValue::Duration(b)) => {
                Ok(PropertyValue::Duration(a + b))
            }
            (PropertyValue::Text(a), PropertyValue::Text(b)) => {
                Ok(PropertyValue::Text(format!("{a}{b}")))
            }
            (left, right) => Err(ProfileError::ValueMismatch {
                left: left.kind(),
                right: right.kind(),
            }),
        }
    }

    /// Total order used for display and `max`
    pub fn compare(&self, other: &PropertyValue) -> Ordering {
        if let (PropertyValue::Text(a), PropertyValue::Text(b)) = (self, other) {
            return a.cmp(b);
        }
        match (self.numeric_value(), other.numeric_value()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }

    /// The greater of two values; ties keep `self`
    pub fn max<'a>(&'a self, other: &'a PropertyValue) -> &'a PropertyValue {
        if self.compare(other) != Ordering::Less {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Ratio { .. } => {
                let v = self.numeric_value().unwrap_or(0.0);
                write!(f, "{:.2}", v * 100.0)
            }
            PropertyValue::Text(s) => write!(f, "{s}"),
            PropertyValue::Number(x) | PropertyValue::Duration(x) => {
                write!(f, "{}", format_grouped(*x))
            }
        }
    }
}

/// Render a number with thousands separators and at most two fraction digits
///
/// `1234.567` renders as `1,234.57`, `12.0` as `12`.
pub fn format_grouped(x: f64) -> String {
    if !x.is_finite() {
        return x.to_string();
    }

    let fixed = format!("{:.2}", x.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let negative = x < 0.0 && (grouped != "0" || !frac_part.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
