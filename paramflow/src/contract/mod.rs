//! Contracts: ordered, immutable field declarations.
//!
//! A contract is built once (usually at startup) by [`ContractBuilder`] and
//! then shared read-only by every pipeline invocation. All definition errors
//! (unknown type, unknown shape, bad regex, duplicate field) surface from
//! `build`, never during validation.

mod field;
mod options;
mod shapes;

pub use field::{Coercion, DefaultValue, FieldBuilder, FieldSpec, Rules};
pub use shapes::ShapeRegistry;

use crate::errors::DefinitionError;
use crate::validation::{self, ValidationOutcome};
use crate::value::{FieldName, ParamsMap};
use std::collections::HashSet;
use std::sync::Arc;

/// An ordered list of field specifications with unique names.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    fields: Vec<FieldSpec>,
}

impl Contract {
    /// Starts building a contract.
    #[must_use]
    pub fn builder() -> ContractBuilder {
        ContractBuilder::new()
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &FieldName) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| &f.name == name)
    }

    /// Returns true if the field is declared.
    #[must_use]
    pub fn contains(&self, name: &FieldName) -> bool {
        self.get(name).is_some()
    }

    /// Returns the declared names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.iter().map(|f| &f.name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates params against this contract.
    #[must_use]
    pub fn validate(&self, params: &ParamsMap) -> ValidationOutcome {
        validation::validate(self, params)
    }
}

/// Builder producing an immutable [`Contract`].
#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    fields: Vec<FieldBuilder>,
    shapes: Arc<ShapeRegistry>,
}

impl ContractBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the registry used to resolve shape checks.
    #[must_use]
    pub fn with_shapes(mut self, shapes: Arc<ShapeRegistry>) -> Self {
        self.shapes = shapes;
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds several fields.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldBuilder>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Adds a field from data-level `(kind, argument)` options.
    ///
    /// See [`FieldBuilder::from_options`].
    #[must_use]
    pub fn field_options(self, name: impl Into<FieldName>, options: &ParamsMap) -> Self {
        self.field(FieldBuilder::from_options(name, options))
    }

    /// Resolves every field and freezes the contract.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] for duplicate names, unknown types or
    /// shapes, invalid regexes and malformed check arguments.
    pub fn build(self) -> Result<Contract, DefinitionError> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        let mut fields = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            if !seen.insert(field.name().clone()) {
                return Err(DefinitionError::DuplicateField(field.name().clone()));
            }
            fields.push(field.build(&self.shapes)?);
        }

        Ok(Contract { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let contract = Contract::builder()
            .field(FieldBuilder::new("b"))
            .field(FieldBuilder::new("a"))
            .field(FieldBuilder::new(FieldName::atom("c")))
            .build()
            .unwrap();

        let names: Vec<_> = contract.field_names().map(FieldName::as_str).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(contract.len(), 3);
    }

    #[test]
    fn test_duplicate_field() {
        let result = Contract::builder()
            .field(FieldBuilder::new("a"))
            .field(FieldBuilder::new("a"))
            .build();

        assert!(matches!(result, Err(DefinitionError::DuplicateField(_))));
    }

    #[test]
    fn test_string_and_atom_names_do_not_collide() {
        let contract = Contract::builder()
            .field(FieldBuilder::new("a"))
            .field(FieldBuilder::new(FieldName::atom("a")))
            .build()
            .unwrap();

        assert!(contract.contains(&FieldName::str("a")));
        assert!(contract.contains(&FieldName::atom("a")));
    }

    #[test]
    fn test_unknown_shape_in_inner_child() {
        let result = Contract::builder()
            .with_shapes(Arc::new(ShapeRegistry::new().define("User", ["name"])))
            .field(FieldBuilder::new("data").inner([
                FieldBuilder::new("owner").shape("User"),
                FieldBuilder::new("group").shape("Group"),
            ]))
            .build();

        assert!(matches!(result, Err(DefinitionError::UnknownShape { ref shape, .. }) if shape == "Group"));
    }
}
