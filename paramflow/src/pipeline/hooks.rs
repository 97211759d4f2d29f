//! Fallback and callback side channels.

use super::PipelineResult;
use crate::value::ParamsMap;
use serde::Deserialize;

/// Handler invoked when a pipeline does not succeed.
///
/// Receives the pipeline id, the normalized input as given (before alias
/// resolution) and the error or interrupt result.
#[cfg_attr(test, mockall::automock)]
pub trait Fallback {
    /// Handles a failed invocation.
    fn handle(&self, pipeline: &str, params: &ParamsMap, error: &PipelineResult) -> PipelineResult;
}

impl<F> Fallback for F
where
    F: Fn(&str, &ParamsMap, &PipelineResult) -> PipelineResult,
{
    fn handle(&self, pipeline: &str, params: &ParamsMap, error: &PipelineResult) -> PipelineResult {
        self(pipeline, params, error)
    }
}

/// How a fallback's return value is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// When set, the fallback's return replaces the visible result.
    pub take_over: bool,
}

impl FallbackConfig {
    /// The fallback runs for its side effect only.
    #[must_use]
    pub fn side_effect() -> Self {
        Self { take_over: false }
    }

    /// The fallback's return becomes the result.
    #[must_use]
    pub fn take_over() -> Self {
        Self { take_over: true }
    }
}

/// Handler invoked after a successful invocation. Its return is ignored.
#[cfg_attr(test, mockall::automock)]
pub trait Callback {
    /// Observes a successful invocation.
    fn on_success(
        &self,
        pipeline: &str,
        params: &ParamsMap,
        result: &PipelineResult,
        options: &ParamsMap,
    );
}

impl<F> Callback for F
where
    F: Fn(&str, &ParamsMap, &PipelineResult, &ParamsMap),
{
    fn on_success(
        &self,
        pipeline: &str,
        params: &ParamsMap,
        result: &PipelineResult,
        options: &ParamsMap,
    ) {
        self(pipeline, params, result, options);
    }
}

/// Options forwarded to the callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackConfig {
    /// Passed verbatim as the callback's last argument.
    pub options: ParamsMap,
}

impl CallbackConfig {
    /// Creates a config without options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, options: ParamsMap) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::value::{FieldName, Value};

    #[test]
    fn test_closure_fallback() {
        let fallback = |pipeline: &str, _: &ParamsMap, _: &PipelineResult| {
            PipelineResult::opaque(Value::from(pipeline))
        };

        let out = fallback.handle("orders", &ParamsMap::new(), &PipelineResult::process("x"));
        assert_eq!(out, PipelineResult::opaque("orders"));
    }

    #[test]
    fn test_fallback_config_deserialize() {
        let config: FallbackConfig = serde_json::from_value(serde_json::json!({"take_over": true})).unwrap();
        assert_eq!(config, FallbackConfig::take_over());

        let config: FallbackConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config, FallbackConfig::side_effect());
    }

    #[test]
    fn test_mock_callback_receives_options() {
        let mut callback = MockCallback::new();
        callback
            .expect_on_success()
            .times(1)
            .returning(|pipeline, _, result, options| {
                assert_eq!(pipeline, "orders");
                assert!(result.is_ok());
                assert!(options.contains_key(&FieldName::str("notify")));
            });

        let config = CallbackConfig::new().with_options(params! { "notify" => true });
        callback.on_success("orders", &ParamsMap::new(), &PipelineResult::ok(1), &config.options);
    }
}
