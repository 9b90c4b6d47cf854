//! Inclusive numeric ranges used for colour scales and thresholds

use std::fmt;

/// A closed interval `[min, max]`; empty when `min > max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The range containing nothing
    pub fn empty() -> Self {
        Self {
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    /// Smallest range containing every value
    pub fn from_values<I: IntoIterator<Item = f64>>(data: I) -> Self {
        data.into_iter().fold(Self::empty(), |r, x| Self {
            min: r.min.min(x),
            max: r.max.max(x),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Empty or a single point: no spread to scale against
    pub fn is_degenerate(&self) -> bool {
        self.is_empty() || self.is_point()
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// Widest range covering both; an empty operand is absorbed
    pub fn union(&self, other: &NumericRange) -> NumericRange {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        NumericRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max - self.min
        }
    }

    /// Position of `x` in this range, scaled to 0–100
    ///
    /// Saturates to 100 when the range is empty or a single point.
    pub fn percents(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 100.0;
        }
        100.0 * (x - self.min) / self.width()
    }

    /// Value sitting at `percentage` of this range; `min` when degenerate
    pub fn quantile(&self, percentage: f64) -> f64 {
        if self.is_degenerate() {
            return self.min;
        }
        self.min + percentage / 100.0 * self.width()
    }
}

impl Default for NumericRange {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[empty]")
        } else if self.is_point() {
            write!(f, "[{}]", self.min)
        } else {
            write!(f, "[{} - {}]", self.min, self.max)
        }
    }
}
