//! Error types for the paramflow framework.
//!
//! Only two kinds of error ever leave the engine as `Err`:
//! - `DefinitionError`, raised while building a contract or pipeline
//! - `StrictError`, raised by strict invocation mode
//!
//! Validation, authorization, interrupt and process failures of an ordinary
//! run are data inside a `PipelineResult`.

use crate::validation::FieldErrors;
use crate::value::{FieldName, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for paramflow operations.
#[derive(Debug, Error)]
pub enum ParamflowError {
    /// A contract or pipeline definition is invalid.
    #[error("{0}")]
    Definition(#[from] DefinitionError),

    /// A strict-mode invocation failed.
    #[error("{0}")]
    Strict(#[from] StrictError),
}

/// Common definition error codes.
pub mod codes {
    /// Unknown type name in a `type` check.
    pub const UNKNOWN_TYPE: &str = "CONTRACT-001-UNKNOWN_TYPE";
    /// Unknown nominal shape reference.
    pub const UNKNOWN_SHAPE: &str = "CONTRACT-002-UNKNOWN_SHAPE";
    /// Field declared twice.
    pub const DUPLICATE_FIELD: &str = "CONTRACT-003-DUPLICATE";
    /// Regex in a `format` check does not compile.
    pub const INVALID_FORMAT: &str = "CONTRACT-004-FORMAT";
    /// Check argument has the wrong shape.
    pub const INVALID_ARGUMENT: &str = "CONTRACT-005-ARGUMENT";
    /// Pipeline has no business logic.
    pub const MISSING_OPERATION: &str = "PIPELINE-001-OPERATION";
    /// Pipeline identifier is empty.
    pub const EMPTY_ID: &str = "PIPELINE-002-EMPTY_ID";
}

/// Metadata about a definition error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-001-UNKNOWN_TYPE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised while building a contract or a pipeline.
///
/// Never produced during a run.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A `type` check names a type that does not exist.
    #[error("Field '{field}': unknown type '{type_name}'")]
    UnknownType {
        /// The field declaring the check.
        field: FieldName,
        /// The unknown type name.
        type_name: String,
    },

    /// A shape check references a shape that is not registered.
    #[error("Field '{field}': unknown shape '{shape}'")]
    UnknownShape {
        /// The field declaring the check.
        field: FieldName,
        /// The unknown shape name.
        shape: String,
    },

    /// Two fields share a name.
    #[error("Field '{0}' is declared more than once")]
    DuplicateField(FieldName),

    /// A `format` pattern does not compile.
    #[error("Field '{field}': invalid format pattern '{pattern}': {source}")]
    InvalidFormat {
        /// The field declaring the check.
        field: FieldName,
        /// The pattern text.
        pattern: String,
        /// The regex compilation error.
        source: regex::Error,
    },

    /// A check argument has the wrong shape.
    #[error("Field '{field}': invalid argument for '{check}': {reason}")]
    InvalidArgument {
        /// The field declaring the check.
        field: FieldName,
        /// The check kind.
        check: String,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A pipeline was built without business logic.
    #[error("Pipeline '{0}' has no operation")]
    MissingOperation(String),

    /// A pipeline identifier is empty or whitespace-only.
    #[error("Pipeline id cannot be empty or whitespace-only")]
    EmptyId,
}

impl DefinitionError {
    /// Returns structured diagnostics for this error.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        match self {
            Self::UnknownType { field, type_name } => {
                ContractErrorInfo::new(codes::UNKNOWN_TYPE, self.to_string())
                    .with_fix_hint("Use one of the built-in type names, e.g. 'integer' or 'string'.")
                    .with_context_entry("field", field.to_string())
                    .with_context_entry("type", type_name.clone())
            }
            Self::UnknownShape { field, shape } => {
                ContractErrorInfo::new(codes::UNKNOWN_SHAPE, self.to_string())
                    .with_fix_hint("Register the shape in the ShapeRegistry passed to the contract builder.")
                    .with_context_entry("field", field.to_string())
                    .with_context_entry("shape", shape.clone())
            }
            Self::DuplicateField(field) => {
                ContractErrorInfo::new(codes::DUPLICATE_FIELD, self.to_string())
                    .with_fix_hint("Rename or merge the duplicate field declarations.")
                    .with_context_entry("field", field.to_string())
            }
            Self::InvalidFormat { field, pattern, .. } => {
                ContractErrorInfo::new(codes::INVALID_FORMAT, self.to_string())
                    .with_context_entry("field", field.to_string())
                    .with_context_entry("pattern", pattern.clone())
            }
            Self::InvalidArgument { field, check, .. } => {
                ContractErrorInfo::new(codes::INVALID_ARGUMENT, self.to_string())
                    .with_context_entry("field", field.to_string())
                    .with_context_entry("check", check.clone())
            }
            Self::MissingOperation(id) => {
                ContractErrorInfo::new(codes::MISSING_OPERATION, self.to_string())
                    .with_fix_hint("Call `operation` or `process` on the builder.")
                    .with_context_entry("pipeline", id.clone())
            }
            Self::EmptyId => ContractErrorInfo::new(codes::EMPTY_ID, self.to_string()),
        }
    }
}

/// Fault raised by strict invocation mode.
#[derive(Debug, Clone, Error)]
pub enum StrictError {
    /// Parameters failed validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Business logic returned an error.
    #[error("Process error: {0}")]
    Process(Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_error_info() {
        let err = DefinitionError::UnknownType {
            field: FieldName::atom("age"),
            type_name: "integr".to_string(),
        };

        let info = err.error_info();
        assert_eq!(info.code, codes::UNKNOWN_TYPE);
        assert_eq!(info.context.get("type"), Some(&"integr".to_string()));
        assert!(err.to_string().contains("unknown type 'integr'"));
    }

    #[test]
    fn test_duplicate_field_display() {
        let err = DefinitionError::DuplicateField(FieldName::str("a"));
        assert_eq!(err.to_string(), "Field 'a' is declared more than once");
        assert_eq!(err.error_info().code, codes::DUPLICATE_FIELD);
    }

    #[test]
    fn test_paramflow_error_from_definition() {
        let err: ParamflowError = DefinitionError::EmptyId.into();
        assert!(matches!(err, ParamflowError::Definition(DefinitionError::EmptyId)));
    }

    #[test]
    fn test_strict_error_display() {
        let err = StrictError::Process(Value::atom("banned"));
        assert_eq!(err.to_string(), "Process error: :banned");
    }

    #[test]
    fn test_error_info_serialization() {
        let info = ContractErrorInfo::new("X", "y").with_fix_hint("z");
        let json = serde_json::to_string(&info).unwrap();
        let back: ContractErrorInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
