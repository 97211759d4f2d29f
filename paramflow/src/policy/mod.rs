//! Named authorization policies and their registry.
//!
//! A policy groups named actions. Each action receives the caller-supplied
//! context and answers `Bool(true)` to allow, `Bool(false)` to deny with the
//! action name as reason, or any other value to deny with that value.

use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Function backing one policy action.
pub type ActionFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A named set of actions.
#[derive(Clone)]
pub struct Policy {
    name: String,
    actions: HashMap<String, ActionFn>,
}

impl Policy {
    /// Creates a policy without actions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: HashMap::new(),
        }
    }

    /// Adds an action.
    #[must_use]
    pub fn action<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(f));
        self
    }

    /// Returns the policy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the action exists.
    #[must_use]
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    /// Invokes an action, or `None` if it is not defined.
    #[must_use]
    pub fn invoke(&self, action: &str, context: &Value) -> Option<Value> {
        self.actions.get(action).map(|f| f(context))
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("Policy")
            .field("name", &self.name)
            .field("actions", &actions)
            .finish()
    }
}

/// Registry resolving policies by name.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    policies: RwLock<HashMap<String, Arc<Policy>>>,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a policy under its own name.
    pub fn register(&self, policy: Policy) {
        self.policies
            .write()
            .insert(policy.name.clone(), Arc::new(policy));
    }

    /// Looks up a policy.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Policy>> {
        self.policies.read().get(name).cloned()
    }

    /// Returns true if a policy is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.policies.read().contains_key(name)
    }

    /// Lists registered policy names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.policies.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves `policy.action` and invokes it with `context`.
    ///
    /// Returns `None` when either the policy or the action is unknown.
    #[must_use]
    pub fn evaluate(&self, policy: &str, action: &str, context: &Value) -> Option<Value> {
        self.get(policy)?.invoke(action, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PolicyRegistry {
        let registry = PolicyRegistry::new();
        registry.register(
            Policy::new("posts")
                .action("edit", |ctx| Value::Bool(matches!(ctx, Value::Atom(a) if a == "admin")))
                .action("ban", |_| Value::atom("banned")),
        );
        registry
    }

    #[test]
    fn test_evaluate_known_action() {
        let registry = registry();

        assert_eq!(
            registry.evaluate("posts", "edit", &Value::atom("admin")),
            Some(Value::Bool(true))
        );
        assert_eq!(
            registry.evaluate("posts", "edit", &Value::atom("guest")),
            Some(Value::Bool(false))
        );
        assert_eq!(
            registry.evaluate("posts", "ban", &Value::Null),
            Some(Value::atom("banned"))
        );
    }

    #[test]
    fn test_unknown_policy_or_action() {
        let registry = registry();

        assert!(registry.evaluate("comments", "edit", &Value::Null).is_none());
        assert!(registry.evaluate("posts", "delete", &Value::Null).is_none());
    }

    #[test]
    fn test_register_replaces() {
        let registry = registry();
        registry.register(Policy::new("posts"));

        assert_eq!(registry.names(), vec!["posts".to_string()]);
        assert!(!registry.get("posts").unwrap().has_action("edit"));
    }
}
