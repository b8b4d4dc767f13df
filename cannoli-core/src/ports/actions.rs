//! The actions interface: host-defined named callables that content/HTTP
//! nodes can invoke by name, distinct from the built-in forced-function
//! tools (`choice`/`note_select`/`form`) a call node uses internally.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CannoliError;

/// Where an action's declared argument is sourced from (§6 Actions'
/// `argInfo`), distinct from how its text is coerced (`ArgType`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgCategory {
    /// Read from the run's `RunConfig` by name.
    Config,
    /// Read from the run's `RunConfig` by name; redacted wherever config is
    /// logged or dumped.
    Secret,
    /// A capability flag: the action reaches the real file-manager port
    /// through its own side channel, not through the args value.
    FileManager,
    /// A capability flag: the action reaches the real fetcher port through
    /// its own side channel, not through the args value.
    Fetcher,
    /// Sourced from an incoming labeled edge; passed through untouched if no
    /// matching edge is present.
    Extra,
    /// Sourced from an incoming labeled edge, coerced per `ty`.
    Arg,
}

/// How a sourced argument's raw text should be coerced before being placed
/// in the args object an action receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgType {
    Number,
    Boolean,
    String,
    StringList,
}

/// One declared argument an action expects, by name.
#[derive(Clone, Debug, PartialEq)]
pub struct ArgInfo {
    pub name: String,
    pub category: ArgCategory,
    pub ty: ArgType,
}

impl ArgInfo {
    pub fn new(name: impl Into<String>, category: ArgCategory, ty: ArgType) -> Self {
        Self { name: name.into(), category, ty }
    }
}

#[async_trait]
pub trait Action: Send + Sync {
    async fn call(&self, args: Value) -> Result<Value, CannoliError>;

    /// Declares how each named argument this action expects should be
    /// sourced and coerced. An action with no declarations (the default)
    /// receives every incoming labeled value verbatim as a string, plus its
    /// rendered input text under the reserved key `"input"`.
    fn arg_info(&self) -> Vec<ArgInfo> {
        Vec::new()
    }

    /// True for an action whose `call` result is only an intermediate value
    /// that `receive` must finalize (a two-phase, "receive-style" action).
    fn is_receive_style(&self) -> bool {
        false
    }

    /// Finalizes a receive-style action's intermediate `call` result.
    /// Unused by ordinary single-phase actions, which never call it.
    async fn receive(&self, intermediate: Value) -> Result<Value, CannoliError> {
        Ok(intermediate)
    }
}

pub trait Actions: Send + Sync {
    fn get(&self, name: &str) -> Option<Arc<dyn Action>>;
}

/// A registry of in-process closures, for tests and simple host integrations.
pub struct MockActions {
    registered: HashMap<String, Arc<dyn Action>>,
}

impl MockActions {
    pub fn new() -> Self {
        Self { registered: HashMap::new() }
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Arc<dyn Action>) -> Self {
        self.registered.insert(name.into(), action);
        self
    }
}

impl Default for MockActions {
    fn default() -> Self {
        Self::new()
    }
}

impl Actions for MockActions {
    fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.registered.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Action for Echo {
        async fn call(&self, args: Value) -> Result<Value, CannoliError> {
            Ok(args)
        }
    }

    /// **Scenario**: a registered action is retrievable by name and executes.
    #[tokio::test]
    async fn mock_actions_registers_and_invokes_by_name() {
        let actions = MockActions::new().with_action("echo", Arc::new(Echo));
        let action = actions.get("echo").expect("echo registered");
        let result = action.call(serde_json::json!({"x": 1})).await.unwrap();
        assert_eq!(result, serde_json::json!({"x": 1}));
    }

    /// **Scenario**: an unregistered name returns `None`.
    #[test]
    fn mock_actions_unregistered_name_is_none() {
        let actions = MockActions::new();
        assert!(actions.get("missing").is_none());
    }
}
