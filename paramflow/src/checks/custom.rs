//! User-supplied predicate checks.

use super::CheckResult;
use crate::value::{FieldName, ParamsMap, Value};
use std::fmt;
use std::sync::Arc;

/// What a custom predicate returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value is valid.
    Valid,
    /// The value is invalid; reported as "isn't valid".
    Invalid,
    /// The value is invalid with a custom message.
    InvalidWith(String),
}

impl Verdict {
    /// An invalid verdict carrying `message`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::InvalidWith(message.into())
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

type ValueFn = dyn Fn(&Value) -> Verdict + Send + Sync;
type ParamsFn = dyn Fn(&ParamsMap, &Value) -> Verdict + Send + Sync;
type FieldFn = dyn Fn(&ParamsMap, &FieldName, &Value) -> Verdict + Send + Sync;

/// A custom predicate in one of three calling shapes.
#[derive(Clone)]
pub enum CustomCheck {
    /// Receives the value only.
    Value(Arc<ValueFn>),
    /// Receives all params and the value.
    WithParams(Arc<ParamsFn>),
    /// Receives all params, the field name and the value.
    WithField(Arc<FieldFn>),
}

impl CustomCheck {
    /// Predicate over the value.
    pub fn value<F, R>(f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self::Value(Arc::new(move |v: &Value| -> Verdict { f(v).into() }))
    }

    /// Predicate over all params and the value.
    pub fn with_params<F, R>(f: F) -> Self
    where
        F: Fn(&ParamsMap, &Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self::WithParams(Arc::new(move |p: &ParamsMap, v: &Value| -> Verdict { f(p, v).into() }))
    }

    /// Predicate over all params, the field name and the value.
    pub fn with_field<F, R>(f: F) -> Self
    where
        F: Fn(&ParamsMap, &FieldName, &Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self::WithField(Arc::new(move |p: &ParamsMap, n: &FieldName, v: &Value| -> Verdict {
            f(p, n, v).into()
        }))
    }

    pub(super) fn run(&self, params: &ParamsMap, field: &FieldName, value: &Value) -> CheckResult {
        let verdict = match self {
            Self::Value(f) => f(value),
            Self::WithParams(f) => f(params, value),
            Self::WithField(f) => f(params, field, value),
        };
        match verdict {
            Verdict::Valid => CheckResult::Pass,
            Verdict::Invalid => CheckResult::fail("isn't valid"),
            Verdict::InvalidWith(message) => CheckResult::Fail(message),
        }
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Self::Value(_) => "value",
            Self::WithParams(_) => "params, value",
            Self::WithField(_) => "params, field, value",
        };
        write!(f, "CustomCheck(fn({shape}))")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_value_shape() {
        let check = CustomCheck::value(|v| matches!(v, Value::Int(n) if *n % 2 == 0));
        let params = ParamsMap::new();
        let field = FieldName::atom("n");

        assert!(check.run(&params, &field, &Value::Int(4)).is_pass());
        assert_eq!(check.run(&params, &field, &Value::Int(3)), CheckResult::fail("isn't valid"));
    }

    #[test]
    fn test_params_shape_cross_field() {
        let check = CustomCheck::with_params(|params, v| {
            params
                .get(&FieldName::atom("max"))
                .and_then(Value::as_number)
                .zip(v.as_number())
                .is_some_and(|(max, n)| n.as_f64() <= max.as_f64())
        });
        let params = params! { FieldName::atom("max") => 10 };
        let field = FieldName::atom("n");

        assert!(check.run(&params, &field, &Value::Int(10)).is_pass());
        assert!(!check.run(&params, &field, &Value::Int(11)).is_pass());
    }

    #[test]
    fn test_field_shape_custom_message() {
        let check = CustomCheck::with_field(|_, name, _| {
            Verdict::error(format!("{name} is taken"))
        });

        assert_eq!(
            check.run(&ParamsMap::new(), &FieldName::atom("login"), &Value::from("x")),
            CheckResult::fail("login is taken")
        );
    }
}
