//! Dynamic value model shared by contracts, pipelines and chains.
//!
//! This module contains:
//! - `FieldName`, the key type of every parameter map
//! - `Value`, the closed set of runtime value kinds
//! - `Record`, a field map tagged with a nominal shape
//! - `Number`, the numeric view used by numericality and length checks
//! - input normalization into a `ParamsMap`

mod normalize;

pub use normalize::{normalize, IntoParams};

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Ordered mapping of field names to values.
///
/// Used for raw input, intermediate pipeline state and business-logic input.
pub type ParamsMap = IndexMap<FieldName, Value>;

/// Identifier of a parameter.
///
/// A string key and an atom key with the same text are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    /// A string key.
    Str(String),
    /// A symbol-like key.
    Atom(String),
}

impl FieldName {
    /// Creates a string key.
    #[must_use]
    pub fn str(name: impl Into<String>) -> Self {
        Self::Str(name.into())
    }

    /// Creates an atom key.
    #[must_use]
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    /// Returns the key text regardless of its kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Str(s) | Self::Atom(s) => s,
        }
    }

    /// Returns true for atom keys.
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }

    /// Qualifies `child` as a member of this field: `parent[:child]`.
    ///
    /// `child` is taken verbatim. Nesting composes from the outside in, so a
    /// qualified parent yields `a[:b][:c]`.
    #[must_use]
    pub fn qualify_member(&self, child: &Self) -> Self {
        Self::Str(format!("{}[:{}]", self.as_str(), child.as_str()))
    }

    /// Qualifies a list element of this field: `parent[index]`.
    #[must_use]
    pub fn qualify_index(&self, index: usize) -> Self {
        Self::Str(format!("{}[{index}]", self.as_str()))
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FieldName {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldName {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&FieldName> for FieldName {
    fn from(value: &FieldName) -> Self {
        value.clone()
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A field map tagged with the name of its nominal shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    shape: String,
    fields: ParamsMap,
}

impl Record {
    /// Creates a record of the given shape.
    #[must_use]
    pub fn new(shape: impl Into<String>, fields: ParamsMap) -> Self {
        Self {
            shape: shape.into(),
            fields,
        }
    }

    /// Returns the shape name.
    #[must_use]
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Returns the record fields.
    #[must_use]
    pub fn fields(&self) -> &ParamsMap {
        &self.fields
    }

    /// Consumes the record, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> ParamsMap {
        self.fields
    }
}

/// Numeric view of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
}

impl Number {
    /// Returns the number as `f64`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Compares two numbers, exactly when both are integers.
    #[must_use]
    pub fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        match value {
            Number::Int(i) => Self::Int(i),
            Number::Float(f) => Self::Float(f),
        }
    }
}

/// A runtime value.
///
/// Equality is strict: `Int(1) != Float(1.0)` and a `Map` never equals a
/// `Record`, even with identical fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The explicit empty marker.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
    /// A symbol-like identifier.
    Atom(String),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A fixed-arity tuple.
    Tuple(Vec<Value>),
    /// A key-value map.
    Map(ParamsMap),
    /// A map with a nominal shape.
    Record(Record),
}

impl Value {
    /// Creates an atom value.
    #[must_use]
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    /// Creates a list value.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Creates a tuple value.
    #[must_use]
    pub fn tuple(items: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Returns true for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the numeric view of integers and floats.
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Returns the string contents of `Str` values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of `List` values.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the fields of maps and records.
    #[must_use]
    pub fn as_fields(&self) -> Option<&ParamsMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Record(record) => Some(record.fields()),
            _ => None,
        }
    }

    /// Converts to a `serde_json::Value`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &ParamsMap) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match key {
            FieldName::Str(s) => write!(f, "{s:?}: {value}")?,
            FieldName::Atom(s) => write!(f, "{s}: {value}")?,
        }
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Atom(a) => write!(f, ":{a}"),
            Self::List(items) => {
                f.write_str("[")?;
                write_seq(f, items)?;
                f.write_str("]")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_seq(f, items)?;
                f.write_str(")")
            }
            Self::Map(fields) => write_fields(f, fields),
            Self::Record(record) => {
                write!(f, "{} ", record.shape)?;
                write_fields(f, &record.fields)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Str(s) | Self::Atom(s) => serializer.serialize_str(s),
            Self::List(items) | Self::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.fields.len() + 1))?;
                map.serialize_entry("__shape__", &record.shape)?;
                for (key, value) in &record.fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<ParamsMap> for Value {
    fn from(value: ParamsMap) -> Self {
        Self::Map(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (FieldName::Str(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Builds a [`ParamsMap`] from `key => value` pairs.
///
/// Keys go through `FieldName::from` (plain strings become string keys) and
/// values through `Value::from`.
///
/// ```
/// use paramflow::params;
/// use paramflow::value::{FieldName, Value};
///
/// let p = params! { "a" => 1, FieldName::atom("b") => "x" };
/// assert_eq!(p.get(&FieldName::str("a")), Some(&Value::Int(1)));
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::value::ParamsMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::ParamsMap::new();
        $( map.insert($crate::value::FieldName::from($key), $crate::value::Value::from($value)); )+
        map
    }};
}
