//! Numericality checks.

use super::CheckResult;
use crate::value::{Number, Value};
use std::cmp::Ordering;

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A single numeric constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericConstraint {
    /// `value == n`.
    EqualTo(Number),
    /// `value > n`.
    GreaterThan(Number),
    /// `value >= n`.
    GreaterThanOrEqualTo(Number),
    /// `value < n`.
    LessThan(Number),
    /// `value <= n`.
    LessThanOrEqualTo(Number),
}

impl NumericConstraint {
    /// `value == n`.
    #[must_use]
    pub fn equal_to(n: impl Into<Number>) -> Self {
        Self::EqualTo(n.into())
    }

    /// `value > n`.
    #[must_use]
    pub fn greater_than(n: impl Into<Number>) -> Self {
        Self::GreaterThan(n.into())
    }

    /// `value >= n`.
    #[must_use]
    pub fn greater_than_or_equal_to(n: impl Into<Number>) -> Self {
        Self::GreaterThanOrEqualTo(n.into())
    }

    /// `value < n`.
    #[must_use]
    pub fn less_than(n: impl Into<Number>) -> Self {
        Self::LessThan(n.into())
    }

    /// `value <= n`.
    #[must_use]
    pub fn less_than_or_equal_to(n: impl Into<Number>) -> Self {
        Self::LessThanOrEqualTo(n.into())
    }

    /// Resolves an option key, including its aliases.
    #[must_use]
    pub fn from_key(key: &str, n: Number) -> Option<Self> {
        match key {
            "equal_to" | "eq" | "equals" | "is" => Some(Self::EqualTo(n)),
            "greater_than" | "gt" => Some(Self::GreaterThan(n)),
            "greater_than_or_equal_to" | "gte" | "min" | "greater_or_equal" => {
                Some(Self::GreaterThanOrEqualTo(n))
            }
            "less_than" | "lt" => Some(Self::LessThan(n)),
            "less_than_or_equal_to" | "lte" | "max" | "less_or_equal" => {
                Some(Self::LessThanOrEqualTo(n))
            }
            _ => None,
        }
    }

    fn evaluate(self, value: Number) -> CheckResult {
        let (bound, accepted, label): (Number, &[Ordering], &str) = match self {
            Self::EqualTo(n) => (n, &[Ordering::Equal], "equal to"),
            Self::GreaterThan(n) => (n, &[Ordering::Greater], "greater than"),
            Self::GreaterThanOrEqualTo(n) => {
                (n, &[Ordering::Greater, Ordering::Equal], "greater than or equal to")
            }
            Self::LessThan(n) => (n, &[Ordering::Less], "less than"),
            Self::LessThanOrEqualTo(n) => {
                (n, &[Ordering::Less, Ordering::Equal], "less than or equal to")
            }
        };

        let ok = value
            .compare(bound)
            .is_some_and(|ordering| accepted.contains(&ordering));
        CheckResult::from_bool(ok, || format!("must be {label} {bound}"))
    }
}

/// Runs every constraint independently.
///
/// A non-numeric value yields a single "not a number" failure.
pub(super) fn check(constraints: &[NumericConstraint], value: &Value) -> Vec<CheckResult> {
    match value.as_number() {
        Some(n) => constraints.iter().map(|c| c.evaluate(n)).collect(),
        None => vec![CheckResult::fail("not a number")],
    }
}
