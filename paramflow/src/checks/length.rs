//! Length checks.

use super::CheckResult;
use crate::value::{Number, Value};
use std::cmp::Ordering;

/// A single length constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum LengthConstraint {
    /// `length >= n` (`min`, `gte`).
    Min(Number),
    /// `length > n`.
    Gt(Number),
    /// `length <= n` (`max`, `lte`).
    Max(Number),
    /// `length < n`.
    Lt(Number),
    /// `length == n`.
    Is(Number),
    /// `lo <= length <= hi`.
    In(Number, Number),
    /// An unrecognized key; always fails.
    Unknown(String),
}

impl LengthConstraint {
    /// `length >= n`.
    #[must_use]
    pub fn min(n: impl Into<Number>) -> Self {
        Self::Min(n.into())
    }

    /// `length <= n`.
    #[must_use]
    pub fn max(n: impl Into<Number>) -> Self {
        Self::Max(n.into())
    }

    /// `length == n`.
    #[must_use]
    pub fn is(n: impl Into<Number>) -> Self {
        Self::Is(n.into())
    }

    /// `lo <= length <= hi`.
    #[must_use]
    pub fn in_range(lo: impl Into<Number>, hi: impl Into<Number>) -> Self {
        Self::In(lo.into(), hi.into())
    }

    /// Resolves an option key and argument.
    ///
    /// Unknown keys become [`LengthConstraint::Unknown`]; a recognized key
    /// with a malformed argument is an error.
    pub fn from_key(key: &str, arg: &Value) -> Result<Self, String> {
        let number = || {
            arg.as_number()
                .ok_or_else(|| format!("'{key}' expects a number, got {arg}"))
        };
        match key {
            "min" | "gte" => number().map(Self::Min),
            "gt" => number().map(Self::Gt),
            "max" | "lte" => number().map(Self::Max),
            "lt" => number().map(Self::Lt),
            "is" => number().map(Self::Is),
            "in" => match arg {
                Value::List(bounds) | Value::Tuple(bounds) if bounds.len() == 2 => {
                    match (bounds[0].as_number(), bounds[1].as_number()) {
                        (Some(lo), Some(hi)) => Ok(Self::In(lo, hi)),
                        _ => Err(format!("'in' expects two numbers, got {arg}")),
                    }
                }
                _ => Err(format!("'in' expects a two-element range, got {arg}")),
            },
            other => Ok(Self::Unknown(other.to_string())),
        }
    }

    fn evaluate(&self, length: Number) -> CheckResult {
        let within = |n: Number, accepted: &[Ordering]| {
            length.compare(n).is_some_and(|o| accepted.contains(&o))
        };
        match self {
            Self::Min(n) => CheckResult::from_bool(within(*n, &[Ordering::Greater, Ordering::Equal]), || {
                format!("length must be greater than or equal to {n}")
            }),
            Self::Gt(n) => CheckResult::from_bool(within(*n, &[Ordering::Greater]), || {
                format!("length must be greater than {n}")
            }),
            Self::Max(n) => CheckResult::from_bool(within(*n, &[Ordering::Less, Ordering::Equal]), || {
                format!("length must be less than or equal to {n}")
            }),
            Self::Lt(n) => CheckResult::from_bool(within(*n, &[Ordering::Less]), || {
                format!("length must be less than {n}")
            }),
            Self::Is(n) => CheckResult::from_bool(within(*n, &[Ordering::Equal]), || {
                format!("length must be equal to {n}")
            }),
            Self::In(lo, hi) => {
                let ok = within(*lo, &[Ordering::Greater, Ordering::Equal])
                    && within(*hi, &[Ordering::Less, Ordering::Equal]);
                CheckResult::from_bool(ok, || format!("length must be in range {lo}..{hi}"))
            }
            Self::Unknown(key) => CheckResult::Fail(format!("unknown check '{key}'")),
        }
    }
}

/// Computes the length of a value by kind.
///
/// Numbers pass through, sequences count elements, strings and atoms count
/// characters, maps and records count pairs, anything else is 0.
#[must_use]
pub fn length_of(value: &Value) -> Number {
    let count = |n: usize| Number::Int(i64::try_from(n).unwrap_or(i64::MAX));
    match value {
        Value::Int(_) | Value::Float(_) => value.as_number().unwrap_or(Number::Int(0)),
        Value::List(items) | Value::Tuple(items) => count(items.len()),
        Value::Str(s) | Value::Atom(s) => count(s.chars().count()),
        Value::Map(fields) => count(fields.len()),
        Value::Record(record) => count(record.fields().len()),
        Value::Null | Value::Bool(_) => Number::Int(0),
    }
}

/// Runs every constraint independently against the value's length.
pub(super) fn check(constraints: &[LengthConstraint], value: &Value) -> Vec<CheckResult> {
    let length = length_of(value);
    constraints.iter().map(|c| c.evaluate(length)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_length_of_kinds() {
        assert_eq!(length_of(&Value::from("héllo")), Number::Int(5));
        assert_eq!(length_of(&Value::atom("abc")), Number::Int(3));
        assert_eq!(length_of(&Value::list([1, 2, 3])), Number::Int(3));
        assert_eq!(length_of(&Value::tuple([1, 2])), Number::Int(2));
        assert_eq!(length_of(&Value::Map(params! { "a" => 1 })), Number::Int(1));
        assert_eq!(length_of(&Value::Float(2.5)), Number::Float(2.5));
        assert_eq!(length_of(&Value::Bool(true)), Number::Int(0));
    }

    #[test]
    fn test_min_failure_message() {
        let results = check(&[LengthConstraint::min(7)], &Value::from("6chars"));
        assert_eq!(
            results,
            vec![CheckResult::fail("length must be greater than or equal to 7")]
        );
    }

    #[test]
    fn test_unknown_key_fails_without_crashing() {
        let constraint = LengthConstraint::from_key("around", &Value::Int(3)).unwrap();
        let results = check(&[constraint, LengthConstraint::max(10)], &Value::from("abc"));

        assert_eq!(
            results,
            vec![CheckResult::fail("unknown check 'around'"), CheckResult::Pass]
        );
    }

    #[test]
    fn test_in_range() {
        let constraint = LengthConstraint::from_key("in", &Value::list([2, 4])).unwrap();
        assert_eq!(check(&[constraint.clone()], &Value::from("abc")), vec![CheckResult::Pass]);
        assert_eq!(
            check(&[constraint], &Value::from("abcde")),
            vec![CheckResult::fail("length must be in range 2..4")]
        );
    }

    #[test]
    fn test_malformed_argument() {
        assert!(LengthConstraint::from_key("min", &Value::from("x")).is_err());
        assert!(LengthConstraint::from_key("in", &Value::Int(3)).is_err());
    }
}
