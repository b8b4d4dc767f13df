//! The shared run context: the handful of things every node and edge
//! behavior needs regardless of subtype — the hydrated graph, the external
//! ports, and the LLM provider. Threaded by reference rather than bundled
//! into the graph itself, since the graph is pure data and these are the
//! run's dependencies on the outside world.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::llm::LlmProvider;
use crate::object::CannoliGraph;
use crate::ports::Ports;

#[derive(Clone)]
pub struct RunContext {
    pub graph: Arc<CannoliGraph>,
    pub ports: Ports,
    pub llm: Arc<dyn LlmProvider>,
    /// True when `llm` is a `MockLlm` — gates the repeat-loop iteration
    /// pause, which exists only to rate-limit a live provider.
    pub is_mock: bool,
    /// Named values a run was started with (HTTP `config`/`secret` argument
    /// categories read from here; a logging edge's config dump redacts
    /// anything marked secret).
    pub config: Arc<RunConfig>,
}

impl RunContext {
    pub fn new(graph: Arc<CannoliGraph>, ports: Ports, llm: Arc<dyn LlmProvider>, is_mock: bool) -> Self {
        Self { graph, ports, llm, is_mock, config: Arc::new(RunConfig::new()) }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = Arc::new(config);
        self
    }
}

/// Named values supplied to a run from outside the graph: host-provided
/// config and secrets an action or HTTP node's `argInfo` can pull by name
/// instead of reading an incoming edge.
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    values: HashMap<String, Value>,
    secrets: HashSet<String>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.values.insert(key.clone(), Value::String(value.into()));
        self.secrets.insert(key);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_secret(&self, key: &str) -> bool {
        self.secrets.contains(key)
    }

    /// Renders every configured key as a `key = value` line, one per line,
    /// sorted by key; a secret's value is replaced with `"<redacted>"`.
    pub fn redacted_dump(&self) -> String {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                if self.secrets.contains(key) {
                    format!("{key} = <redacted>")
                } else {
                    format!("{key} = {}", self.values[key])
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
