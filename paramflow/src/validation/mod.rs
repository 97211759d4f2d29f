//! Runs a contract against params and aggregates failure messages.
//!
//! Fields are visited in contract order; a field's messages follow the
//! declaration order of its checks. Nested (`inner`, `list_item`) failures
//! are reported under qualified names.

use crate::checks::{Check, CheckOutcome, CheckResult};
use crate::contract::{Contract, Rules};
use crate::value::{FieldName, ParamsMap, Value};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Failure messages grouped by field, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<FieldName, Vec<String>>);

impl FieldErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message for `field`.
    pub fn push(&mut self, field: FieldName, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// Returns the messages recorded for `field`.
    #[must_use]
    pub fn messages(&self, field: &FieldName) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns the failing fields in order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldName> {
        self.0.keys()
    }

    /// Iterates `(field, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &[String])> {
        self.0.iter().map(|(field, messages)| (field, messages.as_slice()))
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts into a map value of `field => [messages]`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.0
                .iter()
                .map(|(field, messages)| {
                    (field.clone(), Value::list(messages.iter().map(String::as_str)))
                })
                .collect(),
        )
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, messages)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl FromIterator<(FieldName, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (FieldName, String)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.push(field, message);
        }
        errors
    }
}

/// Result of validating params against a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Every check passed.
    Ok,
    /// At least one check failed.
    Error(FieldErrors),
}

impl ValidationOutcome {
    /// Returns true for `Ok`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns the errors, if any.
    #[must_use]
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Ok => None,
            Self::Error(errors) => Some(errors),
        }
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the field errors when validation failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        match self {
            Self::Ok => Ok(()),
            Self::Error(errors) => Err(errors),
        }
    }
}

/// Validates `params` against `contract`.
#[must_use]
pub fn validate(contract: &Contract, params: &ParamsMap) -> ValidationOutcome {
    let mut outcomes = Vec::new();
    collect(contract, params, &mut outcomes);

    let errors: FieldErrors = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome.result {
            CheckResult::Pass => None,
            CheckResult::Fail(message) => Some((outcome.field, message)),
        })
        .collect();

    if errors.is_empty() {
        ValidationOutcome::Ok
    } else {
        ValidationOutcome::Error(errors)
    }
}

/// Collects every check outcome of `contract` over `params`.
pub(crate) fn collect(contract: &Contract, params: &ParamsMap, out: &mut Vec<CheckOutcome>) {
    for field in contract.fields() {
        collect_field(field.name(), field.name(), field.rules(), params, params.get(field.name()), out);
    }
}

/// Collects the outcomes of one field's rules.
///
/// `key` names the field inside `params` and `path` is the name outcomes
/// are reported under. `value` is `None` when the key is absent.
pub(crate) fn collect_field(
    key: &FieldName,
    path: &FieldName,
    rules: &Rules,
    params: &ParamsMap,
    value: Option<&Value>,
    out: &mut Vec<CheckOutcome>,
) {
    let Some(value) = value else {
        if rules.is_required() {
            out.push(CheckOutcome {
                field: path.clone(),
                result: CheckResult::fail("is required"),
            });
        }
        return;
    };

    if value.is_null() && rules.allows_nil() {
        return;
    }

    for check in rules.checks() {
        if matches!(check, Check::Required(false)) {
            continue;
        }
        check.run(params, key, path, value, out);
    }
}
