//! The pre-validation stages: alias, defaults, coercion, and the
//! declared-field restriction applied before business logic.
//!
//! Each stage takes a map and returns a new one.

use crate::checks::Check;
use crate::contract::{Contract, Rules};
use crate::value::{FieldName, ParamsMap, Record, Value};

/// Moves alias keys onto their canonical field names.
///
/// The alias key is removed. A canonical key already present is
/// overwritten by the alias value.
pub(crate) fn resolve_aliases(contract: &Contract, mut params: ParamsMap) -> ParamsMap {
    for field in contract.fields() {
        let Some(alias) = field.alias() else {
            continue;
        };
        if let Some(value) = params.shift_remove(alias) {
            params.insert(field.name().clone(), value);
        }
    }
    params
}

/// Fills absent fields that declare a default.
///
/// Computed defaults see `received`, the params after alias resolution.
pub(crate) fn apply_defaults(contract: &Contract, mut params: ParamsMap, received: &ParamsMap) -> ParamsMap {
    for field in contract.fields() {
        if params.contains_key(field.name()) {
            continue;
        }
        if let Some(default) = field.default_value() {
            params.insert(field.name().clone(), default.resolve(received));
        }
    }
    params
}

/// Applies coercions to present fields.
///
/// # Errors
///
/// Returns the payload of the first coercion that fails.
pub(crate) fn coerce(contract: &Contract, mut params: ParamsMap, received: &ParamsMap) -> Result<ParamsMap, Value> {
    for field in contract.fields() {
        let Some(value) = params.get(field.name()) else {
            continue;
        };
        let coerced = coerce_value(field.name(), field.rules(), value.clone(), received)?;
        params.insert(field.name().clone(), coerced);
    }
    Ok(params)
}

/// Coerces one value: the field's own coercion first, then nested `inner`
/// and `list_item` rules on the result.
///
/// Coerced child keys are merged into the original nested value, so keys the
/// sub-contract does not declare survive.
fn coerce_value(name: &FieldName, rules: &Rules, value: Value, received: &ParamsMap) -> Result<Value, Value> {
    let mut value = match rules.coercion() {
        Some(coercion) => coercion.apply(name, &value, received)?,
        None => value,
    };

    for check in rules.checks() {
        value = match check {
            Check::Inner(contract) => coerce_nested(contract, value)?,
            Check::ListItem(item_rules) => coerce_items(name, item_rules, value, received)?,
            _ => continue,
        };
    }
    Ok(value)
}

fn coerce_nested(contract: &Contract, value: Value) -> Result<Value, Value> {
    match value {
        Value::Map(fields) => {
            let received = fields.clone();
            Ok(Value::Map(coerce(contract, fields, &received)?))
        }
        Value::Record(record) => {
            let shape = record.shape().to_string();
            let fields = record.into_fields();
            let received = fields.clone();
            Ok(Value::Record(Record::new(shape, coerce(contract, fields, &received)?)))
        }
        other => Ok(other),
    }
}

fn coerce_items(name: &FieldName, rules: &Rules, value: Value, received: &ParamsMap) -> Result<Value, Value> {
    let Value::List(items) = value else {
        return Ok(value);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| coerce_value(&name.qualify_index(index), rules, item, received))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Keeps only declared fields, in contract order.
pub(crate) fn declared_only(contract: &Contract, params: &ParamsMap) -> ParamsMap {
    contract
        .fields()
        .iter()
        .filter_map(|field| {
            params
                .get(field.name())
                .map(|value| (field.name().clone(), value.clone()))
        })
        .collect()
}
