//! Test assertions for pipeline results.

use crate::pipeline::{PipelineResult, ResultStatus};
use crate::value::{FieldName, Value};

/// Asserts that the result is `Ok`.
pub fn assert_ok(result: &PipelineResult) {
    assert!(result.is_ok(), "Expected ok, got: {result}");
}

/// Asserts that the result is `Ok` with the expected value.
pub fn assert_ok_value(result: &PipelineResult, expected: impl Into<Value>) {
    let expected = expected.into();
    assert_eq!(
        result,
        &PipelineResult::Ok(expected.clone()),
        "Expected ok with {expected}, got: {result}"
    );
}

/// Asserts that the result has the expected status.
pub fn assert_status(result: &PipelineResult, expected: ResultStatus) {
    assert_eq!(
        result.status(),
        expected,
        "Expected status {expected}, got {}",
        result.status()
    );
}

/// Asserts that the result is an interrupt carrying `reason`.
pub fn assert_interrupted(result: &PipelineResult, reason: impl Into<Value>) {
    let reason = reason.into();
    assert_eq!(
        result,
        &PipelineResult::Interrupt(reason.clone()),
        "Expected interrupt with {reason}, got: {result}"
    );
}

/// Asserts that the result is a validation error naming exactly `fields`,
/// in order.
pub fn assert_validation_errors(result: &PipelineResult, fields: &[&str]) {
    let Some(errors) = result.field_errors() else {
        panic!("Expected validation errors, got: {result}");
    };
    let actual: Vec<String> = errors.fields().map(ToString::to_string).collect();
    assert_eq!(actual, fields, "Unexpected invalid fields in: {errors}");
}

/// Asserts that `field` failed with `message`.
pub fn assert_field_error(result: &PipelineResult, field: impl Into<FieldName>, message: &str) {
    let field = field.into();
    let Some(errors) = result.field_errors() else {
        panic!("Expected validation errors, got: {result}");
    };
    let messages = errors.messages(&field).unwrap_or_default();
    assert!(
        messages.iter().any(|m| m == message),
        "Expected '{message}' for field {field}, got {messages:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldErrors;

    fn invalid() -> PipelineResult {
        let mut errors = FieldErrors::new();
        errors.push(FieldName::str("age"), "is required");
        errors.push(FieldName::str("name"), "has wrong type; expected string, got 1");
        PipelineResult::validation(errors)
    }

    #[test]
    fn test_assert_ok() {
        assert_ok(&PipelineResult::ok(1));
        assert_ok_value(&PipelineResult::ok("done"), "done");
    }

    #[test]
    #[should_panic(expected = "Expected ok")]
    fn test_assert_ok_fails() {
        assert_ok(&PipelineResult::process("boom"));
    }

    #[test]
    fn test_assert_status() {
        assert_status(&PipelineResult::auth("no"), ResultStatus::AuthError);
        assert_status(&invalid(), ResultStatus::ValidationError);
    }

    #[test]
    fn test_assert_interrupted() {
        assert_interrupted(&PipelineResult::interrupt("stop"), "stop");
    }

    #[test]
    fn test_assert_validation_errors() {
        let result = invalid();
        assert_validation_errors(&result, &["age", "name"]);
        assert_field_error(&result, "age", "is required");
    }

    #[test]
    #[should_panic(expected = "Expected 'too short'")]
    fn test_assert_field_error_fails() {
        assert_field_error(&invalid(), "age", "too short");
    }
}
