//! Normalization of heterogeneous input into a `ParamsMap`.

use super::{FieldName, ParamsMap, Record, Value};
use tracing::warn;

/// Input accepted by pipelines and chains.
///
/// Normalization is total: every input produces a map.
pub trait IntoParams {
    /// Converts the input into a parameter map.
    fn into_params(self) -> ParamsMap;
}

impl IntoParams for ParamsMap {
    fn into_params(self) -> ParamsMap {
        self
    }
}

impl IntoParams for &ParamsMap {
    fn into_params(self) -> ParamsMap {
        self.clone()
    }
}

impl IntoParams for Value {
    fn into_params(self) -> ParamsMap {
        normalize(self)
    }
}

impl IntoParams for Record {
    fn into_params(self) -> ParamsMap {
        self.into_fields()
    }
}

impl IntoParams for serde_json::Value {
    fn into_params(self) -> ParamsMap {
        normalize(Value::from(self))
    }
}

impl<K, V> IntoParams for Vec<(K, V)>
where
    K: Into<FieldName>,
    V: Into<Value>,
{
    fn into_params(self) -> ParamsMap {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

/// Normalizes a value into a parameter map.
///
/// Maps and records yield their fields, keyword lists (lists of two-element
/// tuples keyed by a string or atom) yield their pairs in order, later
/// duplicates winning. `Null` yields an empty map; any other value is logged
/// and also yields an empty map.
pub fn normalize(value: Value) -> ParamsMap {
    match value {
        Value::Map(map) => map,
        Value::Record(record) => record.into_fields(),
        Value::Null => ParamsMap::new(),
        Value::List(items) if items.iter().all(is_pair) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Tuple(mut pair) => {
                    let value = pair.pop()?;
                    let key = match pair.pop()? {
                        Value::Str(s) => FieldName::Str(s),
                        Value::Atom(a) => FieldName::Atom(a),
                        _ => return None,
                    };
                    Some((key, value))
                }
                _ => None,
            })
            .collect(),
        other => {
            warn!(value = %other, "Cannot normalize value into params, using empty params");
            ParamsMap::new()
        }
    }
}

fn is_pair(item: &Value) -> bool {
    matches!(
        item,
        Value::Tuple(pair) if pair.len() == 2 && matches!(pair[0], Value::Str(_) | Value::Atom(_))
    )
}
