//! Pipeline builder.

use super::{
    Authorization, Callback, CallbackConfig, Fallback, FallbackConfig, FnOperation, Halt,
    Operation, Pipeline, ProcessContext, Reply,
};
use crate::contract::Contract;
use crate::errors::DefinitionError;
use crate::events::EventSink;
use crate::policy::{Policy, PolicyRegistry};
use crate::value::ParamsMap;
use std::sync::Arc;

pub(crate) type SharedOperation = Arc<dyn Operation + Send + Sync>;
pub(crate) type SharedFallback = Arc<dyn Fallback + Send + Sync>;
pub(crate) type SharedCallback = Arc<dyn Callback + Send + Sync>;

/// Builder for an immutable [`Pipeline`].
#[derive(Clone)]
pub struct PipelineBuilder {
    id: String,
    contract: Arc<Contract>,
    operation: Option<SharedOperation>,
    auth: Authorization,
    fallback: Option<(SharedFallback, FallbackConfig)>,
    callback: Option<(SharedCallback, CallbackConfig)>,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl PipelineBuilder {
    /// Starts a pipeline with the given id and an empty contract.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contract: Arc::new(Contract::default()),
            operation: None,
            auth: Authorization::default(),
            fallback: None,
            callback: None,
            event_sink: None,
        }
    }

    /// Sets the contract.
    #[must_use]
    pub fn contract(mut self, contract: Contract) -> Self {
        self.contract = Arc::new(contract);
        self
    }

    /// Sets a contract shared with other pipelines.
    #[must_use]
    pub fn shared_contract(mut self, contract: Arc<Contract>) -> Self {
        self.contract = contract;
        self
    }

    /// Sets the business logic.
    #[must_use]
    pub fn operation(mut self, operation: impl Operation + Send + Sync + 'static) -> Self {
        self.operation = Some(Arc::new(operation));
        self
    }

    /// Sets the business logic from a closure.
    #[must_use]
    pub fn process<F>(self, func: F) -> Self
    where
        F: Fn(&ProcessContext, ParamsMap) -> Result<Reply, Halt> + Send + Sync + 'static,
    {
        self.operation(FnOperation::new(func))
    }

    /// Names the policy consulted by `authorize`.
    #[must_use]
    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.auth.policy = Some(policy.into());
        self
    }

    /// Names the policy action consulted by `authorize`.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.auth.action = Some(action.into());
        self
    }

    /// Sets the registry policies are resolved from.
    #[must_use]
    pub fn policy_registry(mut self, registry: Arc<PolicyRegistry>) -> Self {
        self.auth.registry = Some(registry);
        self
    }

    /// Attaches a policy directly and selects it.
    ///
    /// The policy is registered in the pipeline's registry, which is created
    /// if none was set.
    #[must_use]
    pub fn attach_policy(mut self, policy: Policy) -> Self {
        let registry = self
            .auth
            .registry
            .get_or_insert_with(|| Arc::new(PolicyRegistry::new()));
        self.auth.policy = Some(policy.name().to_string());
        registry.register(policy);
        self
    }

    /// Sets the fallback handler.
    #[must_use]
    pub fn fallback(mut self, fallback: impl Fallback + Send + Sync + 'static, config: FallbackConfig) -> Self {
        self.fallback = Some((Arc::new(fallback), config));
        self
    }

    /// Sets the success callback.
    #[must_use]
    pub fn callback(mut self, callback: impl Callback + Send + Sync + 'static, config: CallbackConfig) -> Self {
        self.callback = Some((Arc::new(callback), config));
        self
    }

    /// Sets the event sink; the process-wide sink is used otherwise.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Returns the pipeline id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::EmptyId`] for an empty id and
    /// [`DefinitionError::MissingOperation`] when no business logic was set.
    pub fn build(self) -> Result<Pipeline, DefinitionError> {
        if self.id.trim().is_empty() {
            return Err(DefinitionError::EmptyId);
        }
        let Some(operation) = self.operation else {
            return Err(DefinitionError::MissingOperation(self.id));
        };

        Ok(Pipeline {
            id: Arc::from(self.id),
            contract: self.contract,
            operation,
            auth: Arc::new(self.auth),
            fallback: self.fallback,
            callback: self.callback,
            event_sink: self.event_sink,
        })
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("id", &self.id)
            .field("fields", &self.contract.len())
            .field("auth", &self.auth)
            .field("fallback", &self.fallback.as_ref().map(|(_, config)| config))
            .field("callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn echo(_: &ProcessContext, params: ParamsMap) -> Result<Reply, Halt> {
        Ok(params.into())
    }

    #[test]
    fn test_build_requires_operation() {
        let result = PipelineBuilder::new("orders").build();
        assert!(matches!(result, Err(DefinitionError::MissingOperation(ref id)) if id == "orders"));
    }

    #[test]
    fn test_build_rejects_empty_id() {
        let result = PipelineBuilder::new("  ").process(echo).build();
        assert!(matches!(result, Err(DefinitionError::EmptyId)));
    }

    #[test]
    fn test_attach_policy_selects_it() {
        let builder = PipelineBuilder::new("orders")
            .attach_policy(Policy::new("posts").action("edit", |_| Value::Bool(true)))
            .action("edit");

        assert_eq!(builder.auth.policy(), Some("posts"));
        assert!(builder.auth.registry.as_ref().is_some_and(|r| r.contains("posts")));
        assert!(builder.process(echo).build().is_ok());
    }
}
