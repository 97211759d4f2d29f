//! Type checks.

use super::CheckResult;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Declared value kinds accepted by the `type` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// Any value.
    Any,
    /// `true` or `false`.
    Boolean,
    /// An integer.
    Integer,
    /// A float.
    Float,
    /// An integer or a float.
    Number,
    /// A string.
    String,
    /// An atom.
    Atom,
    /// A list.
    List,
    /// A tuple.
    Tuple,
    /// A map (records excluded).
    Map,
    /// A record of any shape.
    Record,
    /// A list of two-element tuples keyed by atoms.
    Keyword,
    /// The explicit null marker.
    Null,
    /// A string holding a UUID.
    Uuid,
}

impl TypeName {
    /// Every known type.
    pub const ALL: [Self; 14] = [
        Self::Any,
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::Number,
        Self::String,
        Self::Atom,
        Self::List,
        Self::Tuple,
        Self::Map,
        Self::Record,
        Self::Keyword,
        Self::Null,
        Self::Uuid,
    ];

    /// Returns the declared name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Number => "number",
            Self::String => "string",
            Self::Atom => "atom",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Map => "map",
            Self::Record => "record",
            Self::Keyword => "keyword",
            Self::Null => "null",
            Self::Uuid => "uuid",
        }
    }

    /// Returns true if `value` is of this kind.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::Integer => matches!(value, Value::Int(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            Self::String => matches!(value, Value::Str(_)),
            Self::Atom => matches!(value, Value::Atom(_)),
            Self::List => matches!(value, Value::List(_)),
            Self::Tuple => matches!(value, Value::Tuple(_)),
            Self::Map => matches!(value, Value::Map(_)),
            Self::Record => matches!(value, Value::Record(_)),
            Self::Keyword => value.as_list().is_some_and(|items| {
                items.iter().all(|item| {
                    matches!(item, Value::Tuple(pair) if pair.len() == 2 && matches!(pair[0], Value::Atom(_)))
                })
            }),
            Self::Null => value.is_null(),
            Self::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
        }
    }

    pub(super) fn check(self, value: &Value) -> CheckResult {
        CheckResult::from_bool(self.matches(value), || wrong_type(self.as_str(), value))
    }
}

impl FromStr for TypeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn wrong_type(expected: &str, value: &Value) -> String {
    format!("has wrong type; expected {expected}, got {value}")
}

/// Nominal check: a record of exactly this shape, not merely a map with the
/// same fields.
pub(super) fn check_shape(shape: &str, value: &Value) -> CheckResult {
    let ok = matches!(value, Value::Record(record) if record.shape() == shape);
    CheckResult::from_bool(ok, || wrong_type(shape, value))
}
