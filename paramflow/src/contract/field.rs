//! Field specifications and the field builder.

use super::{ContractBuilder, ShapeRegistry};
use crate::checks::{Check, CustomCheck, LengthConstraint, NumericConstraint, TypeName};
use crate::errors::DefinitionError;
use crate::value::{FieldName, ParamsMap, Value};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

type CoerceFn = dyn Fn((&FieldName, &Value), &ParamsMap) -> Result<Value, Value> + Send + Sync;
type DefaultFn = dyn Fn(&ParamsMap) -> Value + Send + Sync;

/// A coercion applied to a present field before validation.
///
/// Receives `(name, current value)` and the received params. An `Err`
/// payload halts the pipeline with that payload as its result.
#[derive(Clone)]
pub struct Coercion(Arc<CoerceFn>);

impl Coercion {
    /// Wraps a coercion function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn((&FieldName, &Value), &ParamsMap) -> Result<Value, Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Applies the coercion.
    pub fn apply(&self, name: &FieldName, value: &Value, received: &ParamsMap) -> Result<Value, Value> {
        (self.0)((name, value), received)
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coercion(..)")
    }
}

/// Default for an absent field.
#[derive(Clone)]
pub enum DefaultValue {
    /// A literal.
    Value(Value),
    /// Computed from the full received params.
    Computed(Arc<DefaultFn>),
}

impl DefaultValue {
    /// Resolves the default against the received params.
    #[must_use]
    pub fn resolve(&self, received: &ParamsMap) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Computed(f) => f(received),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "DefaultValue({value})"),
            Self::Computed(_) => f.write_str("DefaultValue(fn)"),
        }
    }
}

/// The checks and modifiers applied to one value.
///
/// Shared by top-level fields and list-item templates.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub(crate) checks: Vec<Check>,
    pub(crate) allow_nil: bool,
    pub(crate) coerce: Option<Coercion>,
}

impl Rules {
    /// Returns the checks in declaration order.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Returns true if a present `Null` skips every check.
    #[must_use]
    pub fn allows_nil(&self) -> bool {
        self.allow_nil
    }

    /// Returns true if the value must be present.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.checks.iter().any(|c| matches!(c, Check::Required(true)))
    }

    /// Returns the coercion, if any.
    #[must_use]
    pub fn coercion(&self) -> Option<&Coercion> {
        self.coerce.as_ref()
    }
}

/// A fully resolved field of a contract.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: FieldName,
    pub(crate) rules: Rules,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) from: Option<FieldName>,
}

impl FieldSpec {
    /// Returns the canonical field name.
    #[must_use]
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Returns the field's rules.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Returns the default, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Returns the alternate input name, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&FieldName> {
        self.from.as_ref()
    }
}

/// A check declaration that may need resolution at build time.
#[derive(Debug, Clone)]
enum Decl {
    Ready(Check),
    Type(String),
    Shape(String),
    Format(String),
    Inner(Vec<FieldBuilder>),
    ListItem(Box<FieldBuilder>),
    Invalid { check: String, reason: String },
}

/// Fluent builder for one field.
///
/// Nothing is validated until the owning contract is built; declaration
/// order is kept and drives error-message order.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: FieldName,
    decls: Vec<Decl>,
    allow_nil: bool,
    default: Option<DefaultValue>,
    coerce: Option<Coercion>,
    from: Option<FieldName>,
}

impl FieldBuilder {
    /// Starts a field declaration.
    #[must_use]
    pub fn new(name: impl Into<FieldName>) -> Self {
        Self {
            name: name.into(),
            decls: Vec::new(),
            allow_nil: false,
            default: None,
            coerce: None,
            from: None,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Adds a resolved check.
    #[must_use]
    pub fn check(mut self, check: Check) -> Self {
        self.decls.push(Decl::Ready(check));
        self
    }

    /// The key must be present.
    #[must_use]
    pub fn required(self) -> Self {
        self.check(Check::Required(true))
    }

    /// The value must be of the named type.
    #[must_use]
    pub fn type_of(mut self, type_name: impl Into<String>) -> Self {
        self.decls.push(Decl::Type(type_name.into()));
        self
    }

    /// The value must be a record of the named shape.
    #[must_use]
    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.decls.push(Decl::Shape(shape.into()));
        self
    }

    /// Numeric constraints, each reported independently.
    #[must_use]
    pub fn numericality(self, constraints: impl IntoIterator<Item = NumericConstraint>) -> Self {
        self.check(Check::Numericality(constraints.into_iter().collect()))
    }

    /// Length constraints, each reported independently.
    #[must_use]
    pub fn length(self, constraints: impl IntoIterator<Item = LengthConstraint>) -> Self {
        self.check(Check::Length(constraints.into_iter().collect()))
    }

    /// The value must be one of `allowed`.
    #[must_use]
    pub fn one_of(self, allowed: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.check(Check::In(Value::list(allowed)))
    }

    /// The value must not be one of `denied`.
    #[must_use]
    pub fn not_in(self, denied: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.check(Check::NotIn(Value::list(denied)))
    }

    /// String values must match the regex.
    #[must_use]
    pub fn format(mut self, pattern: impl Into<String>) -> Self {
        self.decls.push(Decl::Format(pattern.into()));
        self
    }

    /// The value must strictly equal `expected`.
    #[must_use]
    pub fn equals(self, expected: impl Into<Value>) -> Self {
        self.check(Check::Equals(expected.into()))
    }

    /// The value must be a non-empty list drawn from `allowed`.
    #[must_use]
    pub fn subset_of(self, allowed: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.check(Check::SubsetOf(Value::list(allowed)))
    }

    /// Adds a custom predicate.
    #[must_use]
    pub fn custom(self, check: CustomCheck) -> Self {
        self.check(Check::Custom(check))
    }

    /// Validates a nested map against child fields.
    #[must_use]
    pub fn inner(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.decls.push(Decl::Inner(children.into_iter().collect()));
        self
    }

    /// Validates every list element with the rules declared by `item`.
    #[must_use]
    pub fn list_item(mut self, item: impl FnOnce(Self) -> Self) -> Self {
        let template = item(Self::new(self.name.clone()));
        self.decls.push(Decl::ListItem(Box::new(template)));
        self
    }

    /// A present `Null` skips every check of this field.
    #[must_use]
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    /// Literal default for an absent field.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default computed from the received params.
    #[must_use]
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&ParamsMap) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Computed(Arc::new(f)));
        self
    }

    /// Coercion applied to the present value before validation.
    #[must_use]
    pub fn coerce_with<F>(mut self, f: F) -> Self
    where
        F: Fn((&FieldName, &Value), &ParamsMap) -> Result<Value, Value> + Send + Sync + 'static,
    {
        self.coerce = Some(Coercion::new(f));
        self
    }

    /// Reads the value from an alternate input key.
    #[must_use]
    pub fn from(mut self, alias: impl Into<FieldName>) -> Self {
        self.from = Some(alias.into());
        self
    }

    pub(super) fn invalid(mut self, check: impl Into<String>, reason: impl Into<String>) -> Self {
        self.decls.push(Decl::Invalid {
            check: check.into(),
            reason: reason.into(),
        });
        self
    }

    /// Resolves every declaration into a field spec.
    pub(crate) fn build(self, shapes: &Arc<ShapeRegistry>) -> Result<FieldSpec, DefinitionError> {
        let name = self.name;
        let mut checks = Vec::with_capacity(self.decls.len());

        for decl in self.decls {
            let check = match decl {
                Decl::Ready(check) => check,
                Decl::Type(type_name) => {
                    let parsed = type_name.parse::<TypeName>().map_err(|type_name| {
                        DefinitionError::UnknownType {
                            field: name.clone(),
                            type_name,
                        }
                    })?;
                    Check::Type(parsed)
                }
                Decl::Shape(shape) => {
                    if !shapes.contains(&shape) {
                        return Err(DefinitionError::UnknownShape {
                            field: name,
                            shape,
                        });
                    }
                    Check::Shape(shape)
                }
                Decl::Format(pattern) => match Regex::new(&pattern) {
                    Ok(regex) => Check::Format(regex),
                    Err(source) => {
                        return Err(DefinitionError::InvalidFormat {
                            field: name,
                            pattern,
                            source,
                        })
                    }
                },
                Decl::Inner(children) => {
                    let contract = ContractBuilder::new()
                        .with_shapes(Arc::clone(shapes))
                        .fields(children)
                        .build()?;
                    Check::Inner(Arc::new(contract))
                }
                Decl::ListItem(template) => Check::ListItem(Arc::new(template.build(shapes)?.rules)),
                Decl::Invalid { check, reason } => {
                    return Err(DefinitionError::InvalidArgument {
                        field: name,
                        check,
                        reason,
                    })
                }
            };
            checks.push(check);
        }

        Ok(FieldSpec {
            name,
            rules: Rules {
                checks,
                allow_nil: self.allow_nil,
                coerce: self.coerce,
            },
            default: self.default,
            from: self.from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    fn shapes() -> Arc<ShapeRegistry> {
        Arc::new(ShapeRegistry::new().define("User", ["name"]))
    }

    #[test]
    fn test_build_keeps_declaration_order() {
        let spec = FieldBuilder::new("age")
            .type_of("integer")
            .required()
            .numericality([NumericConstraint::greater_than(0)])
            .build(&shapes())
            .unwrap();

        let kinds: Vec<_> = spec.rules().checks().iter().map(Check::kind).collect();
        assert_eq!(kinds, vec!["type", "required", "numericality"]);
        assert!(spec.rules().is_required());
    }

    #[test]
    fn test_unknown_type_fails_at_build() {
        let err = FieldBuilder::new("age").type_of("integr").build(&shapes()).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownType { ref type_name, .. } if type_name == "integr"));
    }

    #[test]
    fn test_unknown_shape_fails_at_build() {
        assert!(FieldBuilder::new("owner").shape("User").build(&shapes()).is_ok());

        let err = FieldBuilder::new("owner").shape("Account").build(&shapes()).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownShape { .. }));
    }

    #[test]
    fn test_invalid_regex_fails_at_build() {
        let err = FieldBuilder::new("code").format("(unclosed").build(&shapes()).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidFormat { .. }));
    }

    #[test]
    fn test_unknown_type_inside_list_item_fails_at_build() {
        let result = FieldBuilder::new("tags")
            .list_item(|item| item.type_of("strng"))
            .build(&shapes());
        assert!(result.is_err());
    }

    #[test]
    fn test_computed_default() {
        let spec = FieldBuilder::new("b")
            .default_with(|received| received.get(&FieldName::str("a")).cloned().unwrap_or_default())
            .build(&shapes())
            .unwrap();

        let value = spec.default_value().unwrap().resolve(&params! { "a" => 3 });
        assert_eq!(value, Value::Int(3));
    }

    #[test]
    fn test_coercion_apply() {
        let coercion = Coercion::new(|(_, value), _| match value {
            Value::Str(s) => s.parse::<i64>().map(Value::Int).map_err(|_| Value::atom("bad")),
            other => Ok(other.clone()),
        });

        let name = FieldName::str("n");
        assert_eq!(coercion.apply(&name, &Value::from("7"), &ParamsMap::new()), Ok(Value::Int(7)));
        assert_eq!(
            coercion.apply(&name, &Value::from("x"), &ParamsMap::new()),
            Err(Value::atom("bad"))
        );
    }
}
