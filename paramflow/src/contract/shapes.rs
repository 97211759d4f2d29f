//! Registry of nominal record shapes.

use crate::value::{FieldName, ParamsMap, Record, Value};
use indexmap::IndexMap;

/// Known record shapes and their declared fields.
///
/// Shape checks in a contract must reference a registered shape; the lookup
/// happens once, when the contract is built.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    shapes: IndexMap<String, Vec<FieldName>>,
}

impl ShapeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape, returning the registry.
    #[must_use]
    pub fn define(
        mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<FieldName>>,
    ) -> Self {
        self.register(name, fields);
        self
    }

    /// Adds or replaces a shape.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<FieldName>>,
    ) {
        self.shapes
            .insert(name.into(), fields.into_iter().map(Into::into).collect());
    }

    /// Returns true if the shape is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// Returns the declared fields of a shape.
    #[must_use]
    pub fn fields(&self, name: &str) -> Option<&[FieldName]> {
        self.shapes.get(name).map(Vec::as_slice)
    }

    /// Builds a record of a registered shape.
    ///
    /// Only declared fields are kept, in declaration order; missing ones are
    /// `Null`.
    #[must_use]
    pub fn instantiate(&self, name: &str, values: &ParamsMap) -> Option<Record> {
        let declared = self.shapes.get(name)?;
        let fields = declared
            .iter()
            .map(|field| (field.clone(), values.get(field).cloned().unwrap_or(Value::Null)))
            .collect();
        Some(Record::new(name, fields))
    }

    /// Returns the number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true if no shapes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
