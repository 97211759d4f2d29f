//! Literal-list and equality checks.

use super::CheckResult;
use crate::value::Value;

pub(super) fn check_in(allowed: &Value, value: &Value) -> CheckResult {
    match allowed.as_list() {
        Some(items) => CheckResult::from_bool(items.contains(value), || {
            format!("must be one of {allowed}")
        }),
        None => CheckResult::Pass,
    }
}

pub(super) fn check_not_in(denied: &Value, value: &Value) -> CheckResult {
    match denied.as_list() {
        Some(items) => CheckResult::from_bool(!items.contains(value), || {
            format!("must not be included in {denied}")
        }),
        None => CheckResult::Pass,
    }
}

pub(super) fn check_equals(expected: &Value, value: &Value) -> CheckResult {
    CheckResult::from_bool(expected == value, || {
        format!("must be equal to {expected}, got {value}")
    })
}

/// The value must be a list whose elements all appear in `allowed`.
///
/// An empty list is not a subset.
pub(super) fn check_subset_of(allowed: &Value, value: &Value) -> CheckResult {
    let Some(items) = value.as_list() else {
        return CheckResult::fail("must be a list");
    };
    let Some(allowed_items) = allowed.as_list() else {
        return CheckResult::Pass;
    };

    let ok = !items.is_empty() && items.iter().all(|item| allowed_items.contains(item));
    CheckResult::from_bool(ok, || format!("must be a subset of {allowed}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_and_not_in() {
        let allowed = Value::list(["a", "b"]);
        assert!(check_in(&allowed, &Value::from("a")).is_pass());
        assert_eq!(
            check_in(&allowed, &Value::from("c")),
            CheckResult::fail("must be one of [\"a\", \"b\"]")
        );
        assert!(!check_not_in(&allowed, &Value::from("b")).is_pass());
        assert!(check_not_in(&allowed, &Value::from("z")).is_pass());
    }

    #[test]
    fn test_non_list_argument_passes() {
        assert!(check_in(&Value::from("a"), &Value::from("b")).is_pass());
        assert!(check_not_in(&Value::Int(1), &Value::Int(1)).is_pass());
    }

    #[test]
    fn test_in_is_strict() {
        assert!(!check_in(&Value::list([1, 2]), &Value::Float(1.0)).is_pass());
    }

    #[test]
    fn test_equals_reports_both_sides() {
        assert!(check_equals(&Value::Int(1), &Value::Int(1)).is_pass());
        assert_eq!(
            check_equals(&Value::Int(1), &Value::Float(1.0)),
            CheckResult::fail("must be equal to 1, got 1.0")
        );
    }

    #[test]
    fn test_subset_of() {
        let allowed = Value::list([1, 2, 3]);
        assert!(check_subset_of(&allowed, &Value::list([1, 3])).is_pass());
        assert_eq!(check_subset_of(&allowed, &Value::Int(1)), CheckResult::fail("must be a list"));
        assert_eq!(
            check_subset_of(&allowed, &Value::list([1, 4])),
            CheckResult::fail("must be a subset of [1, 2, 3]")
        );
        assert_eq!(
            check_subset_of(&allowed, &Value::List(Vec::new())),
            CheckResult::fail("must be a subset of [1, 2, 3]")
        );
    }
}
