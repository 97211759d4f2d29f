//! Interpretation of data-level check options.
//!
//! A declarative front-end hands over `(kind, argument)` pairs per field;
//! this module maps them onto the typed builder. Unknown kinds are ignored.

use super::FieldBuilder;
use crate::checks::{Check, LengthConstraint, NumericConstraint};
use crate::value::{normalize, FieldName, ParamsMap, Value};
use tracing::debug;

fn option_set(value: &Value) -> Option<ParamsMap> {
    match value {
        Value::Map(_) | Value::Record(_) | Value::List(_) => Some(normalize(value.clone())),
        _ => None,
    }
}

fn name_of(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) | Value::Atom(s) => Some(s.clone()),
        _ => None,
    }
}

impl FieldBuilder {
    /// Builds a field from `(kind, argument)` options.
    ///
    /// Recognized kinds: `required`, `type`, `struct`/`shape`,
    /// `numericality`, `length`, `in`, `not_in`, `format`/`regex`,
    /// `equals`/`exactly`, `subset_of`, `allow_nil`, `inner`, `list_item`,
    /// `default`, `from`. Malformed arguments of recognized kinds are
    /// reported when the contract is built.
    #[must_use]
    pub fn from_options(name: impl Into<FieldName>, options: &ParamsMap) -> Self {
        let mut field = Self::new(name);

        for (kind, arg) in options {
            let kind = kind.as_str();
            field = match kind {
                "required" => match arg {
                    Value::Bool(flag) => field.check(Check::Required(*flag)),
                    other => field.invalid(kind, format!("expects a boolean, got {other}")),
                },
                "allow_nil" => match arg {
                    Value::Bool(true) => field.allow_nil(),
                    Value::Bool(false) => field,
                    other => field.invalid(kind, format!("expects a boolean, got {other}")),
                },
                "type" => match name_of(arg) {
                    Some(type_name) => field.type_of(type_name),
                    None => field.invalid(kind, format!("expects a type name, got {arg}")),
                },
                "struct" | "shape" => match name_of(arg) {
                    Some(shape) => field.shape(shape),
                    None => field.invalid(kind, format!("expects a shape name, got {arg}")),
                },
                "format" | "regex" => match arg {
                    Value::Str(pattern) => field.format(pattern.clone()),
                    other => field.invalid(kind, format!("expects a pattern string, got {other}")),
                },
                "numericality" => numericality(field, arg),
                "length" => length(field, arg),
                "in" => field.check(Check::In(arg.clone())),
                "not_in" => field.check(Check::NotIn(arg.clone())),
                "equals" | "exactly" => field.check(Check::Equals(arg.clone())),
                "subset_of" => field.check(Check::SubsetOf(arg.clone())),
                "default" => field.default(arg.clone()),
                "from" => match arg {
                    Value::Str(s) => field.from(FieldName::str(s.clone())),
                    Value::Atom(a) => field.from(FieldName::atom(a.clone())),
                    other => field.invalid(kind, format!("expects a field name, got {other}")),
                },
                "inner" => match option_set(arg) {
                    Some(children) => {
                        let children: Vec<_> = children
                            .iter()
                            .map(|(child, opts)| match option_set(opts) {
                                Some(opts) => Self::from_options(child.clone(), &opts),
                                None => Self::new(child.clone())
                                    .invalid("inner", format!("expects child options, got {opts}")),
                            })
                            .collect();
                        field.inner(children)
                    }
                    None => field.invalid(kind, format!("expects a map of child options, got {arg}")),
                },
                "list_item" => match option_set(arg) {
                    Some(item_options) => field.list_item(|item| {
                        let name = item.name().clone();
                        Self::from_options(name, &item_options)
                    }),
                    None => field.invalid(kind, format!("expects item options, got {arg}")),
                },
                unknown => {
                    debug!(field = %field.name(), check = unknown, "Ignoring unknown check");
                    field
                }
            };
        }

        field
    }
}

fn numericality(field: FieldBuilder, arg: &Value) -> FieldBuilder {
    let Some(options) = option_set(arg) else {
        return field.invalid("numericality", format!("expects a map of constraints, got {arg}"));
    };

    let mut constraints = Vec::with_capacity(options.len());
    for (key, bound) in &options {
        let Some(n) = bound.as_number() else {
            return field.invalid("numericality", format!("'{key}' expects a number, got {bound}"));
        };
        match NumericConstraint::from_key(key.as_str(), n) {
            Some(constraint) => constraints.push(constraint),
            None => debug!(field = %field.name(), key = %key, "Ignoring unknown numericality key"),
        }
    }
    field.numericality(constraints)
}

fn length(field: FieldBuilder, arg: &Value) -> FieldBuilder {
    let Some(options) = option_set(arg) else {
        return field.invalid("length", format!("expects a map of constraints, got {arg}"));
    };

    let mut constraints = Vec::with_capacity(options.len());
    for (key, bound) in &options {
        match LengthConstraint::from_key(key.as_str(), bound) {
            Ok(constraint) => constraints.push(constraint),
            Err(reason) => return field.invalid("length", reason),
        }
    }
    field.length(constraints)
}
