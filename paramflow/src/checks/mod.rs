//! The closed set of field checks.
//!
//! Every check kind is a variant of [`Check`]; dispatch is a single `match`.
//! Leaf checks are pure functions of the field value (and, for custom
//! checks, the full params). The `Inner` and `ListItem` combinators recurse
//! into the validator.

mod custom;
mod length;
mod membership;
mod numericality;
mod types;

pub use custom::{CustomCheck, Verdict};
pub use length::{length_of, LengthConstraint};
pub use numericality::NumericConstraint;
pub use types::TypeName;

use crate::contract::{Contract, Rules};
use crate::validation;
use crate::value::{FieldName, ParamsMap, Value};
use regex::Regex;
use std::sync::Arc;

/// Result of evaluating a single constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The constraint holds.
    Pass,
    /// The constraint failed with a message.
    Fail(String),
}

impl CheckResult {
    /// Creates a failure.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Returns true for `Pass`.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    fn from_bool(ok: bool, message: impl FnOnce() -> String) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Fail(message())
        }
    }
}

/// A check result attributed to a (possibly qualified) field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// The field the result belongs to.
    pub field: FieldName,
    /// The result.
    pub result: CheckResult,
}

impl CheckOutcome {
    fn new(field: &FieldName, result: CheckResult) -> Self {
        Self {
            field: field.clone(),
            result,
        }
    }
}

/// A check attached to a field.
#[derive(Debug, Clone)]
pub enum Check {
    /// Fails only when the key is absent.
    Required(bool),
    /// The value must be of the given kind.
    Type(TypeName),
    /// The value must be a record of the named shape.
    Shape(String),
    /// Independent numeric constraints.
    Numericality(Vec<NumericConstraint>),
    /// Independent length constraints.
    Length(Vec<LengthConstraint>),
    /// Membership in a literal list; non-list arguments pass.
    In(Value),
    /// Non-membership in a literal list; non-list arguments pass.
    NotIn(Value),
    /// Regex match on strings.
    Format(Regex),
    /// Strict equality.
    Equals(Value),
    /// The value must be a non-empty list drawn from the allowed list.
    SubsetOf(Value),
    /// A user predicate.
    Custom(CustomCheck),
    /// Validates a nested map against a sub-contract.
    Inner(Arc<Contract>),
    /// Validates every list element against the same rules.
    ListItem(Arc<Rules>),
}

impl Check {
    /// Returns the check kind name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Required(_) => "required",
            Self::Type(_) => "type",
            Self::Shape(_) => "struct",
            Self::Numericality(_) => "numericality",
            Self::Length(_) => "length",
            Self::In(_) => "in",
            Self::NotIn(_) => "not_in",
            Self::Format(_) => "format",
            Self::Equals(_) => "equals",
            Self::SubsetOf(_) => "subset_of",
            Self::Custom(_) => "func",
            Self::Inner(_) => "inner",
            Self::ListItem(_) => "list_item",
        }
    }

    /// Runs the check against a present value, appending its outcomes.
    ///
    /// `key` names the value inside `params`; outcomes are reported under
    /// `path`, its fully qualified name.
    pub(crate) fn run(
        &self,
        params: &ParamsMap,
        key: &FieldName,
        path: &FieldName,
        value: &Value,
        out: &mut Vec<CheckOutcome>,
    ) {
        let single = |result: CheckResult| CheckOutcome::new(path, result);
        match self {
            Self::Required(_) => out.push(single(CheckResult::Pass)),
            Self::Type(type_name) => out.push(single(type_name.check(value))),
            Self::Shape(shape) => out.push(single(types::check_shape(shape, value))),
            Self::Numericality(constraints) => out.extend(
                numericality::check(constraints, value)
                    .into_iter()
                    .map(single),
            ),
            Self::Length(constraints) => {
                out.extend(length::check(constraints, value).into_iter().map(single));
            }
            Self::In(allowed) => out.push(single(membership::check_in(allowed, value))),
            Self::NotIn(denied) => out.push(single(membership::check_not_in(denied, value))),
            Self::Format(regex) => out.push(single(check_format(regex, value))),
            Self::Equals(expected) => out.push(single(membership::check_equals(expected, value))),
            Self::SubsetOf(allowed) => {
                out.push(single(membership::check_subset_of(allowed, value)));
            }
            Self::Custom(custom) => out.push(single(custom.run(params, key, value))),
            Self::Inner(contract) => check_inner(contract, path, value, out),
            Self::ListItem(rules) => check_list_item(rules, key, path, value, out),
        }
    }
}

fn check_format(regex: &Regex, value: &Value) -> CheckResult {
    match value {
        Value::Str(s) => CheckResult::from_bool(regex.is_match(s), || {
            "has invalid format".to_string()
        }),
        _ => CheckResult::Pass,
    }
}

fn check_inner(contract: &Contract, path: &FieldName, value: &Value, out: &mut Vec<CheckOutcome>) {
    let Some(fields) = value.as_fields() else {
        out.push(CheckOutcome::new(
            path,
            CheckResult::Fail(format!("has wrong type; expected map, got {value}")),
        ));
        return;
    };

    for field in contract.fields() {
        let child = path.qualify_member(field.name());
        validation::collect_field(field.name(), &child, field.rules(), fields, fields.get(field.name()), out);
    }
}

fn check_list_item(
    rules: &Rules,
    key: &FieldName,
    path: &FieldName,
    value: &Value,
    out: &mut Vec<CheckOutcome>,
) {
    let Some(items) = value.as_list() else {
        out.push(CheckOutcome::new(path, CheckResult::fail("is not a list")));
        return;
    };

    let synthetic: ParamsMap = items
        .iter()
        .enumerate()
        .map(|(index, item)| (key.qualify_index(index), item.clone()))
        .collect();

    for (index, (name, item)) in synthetic.iter().enumerate() {
        validation::collect_field(name, &path.qualify_index(index), rules, &synthetic, Some(item), out);
    }
}
