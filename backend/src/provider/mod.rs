//! Decision providers
//!
//! A provider turns the context an agent sees into a raw decision. The
//! engine stays agnostic about where decisions come from: a scripted list,
//! a deterministic mock, or an external model behind the same trait.
//!
//! # Architecture
//!
//! Providers are trait objects built by a registry keyed on the `provider`
//! field of each roster entry. Failures are classified as timeout, malformed
//! output, or network error; the engine retries a failed turn exactly once
//! before falling back to idle.

mod mock;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::config::AgentSpec;
use crate::orchestrator::TurnContext;

pub use mock::MockProvider;

/// Raw provider output before action parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub reasoning: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Provider failure classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider timed out")]
    Timeout,

    #[error("provider output could not be parsed: {0}")]
    Malformed(String),

    #[error("provider unreachable: {0}")]
    Network(String),
}

/// One agent's decision source
pub trait DecisionProvider {
    /// Decide the agent's action for this turn
    fn decide(&mut self, ctx: &TurnContext) -> Result<Decision, ProviderError>;

    /// Provider kind tag, for log records
    fn kind(&self) -> &str;
}

type ProviderFactory = Box<dyn Fn(&AgentSpec) -> Box<dyn DecisionProvider>>;

/// Maps roster `provider` tags to constructors
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Registry with the built-in `mock` provider
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("mock", |spec| Box::new(MockProvider::for_agent(&spec.id)));
        registry
    }

    pub fn register<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&AgentSpec) -> Box<dyn DecisionProvider> + 'static,
    {
        self.factories.insert(kind.to_string(), Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Build the provider for one roster entry, falling back to `mock`
    /// for unknown tags.
    pub fn build(&self, spec: &AgentSpec) -> Box<dyn DecisionProvider> {
        match self.factories.get(&spec.provider) {
            Some(factory) => factory(spec),
            None => Box::new(MockProvider::for_agent(&spec.id)),
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Replays a fixed script of results, then idles. Test double.
pub struct ScriptedProvider {
    script: std::collections::VecDeque<Result<Decision, ProviderError>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<Decision, ProviderError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Convenience: a script of bare action names with no target/content
    pub fn from_actions(actions: &[&str]) -> Self {
        Self::new(
            actions
                .iter()
                .map(|a| {
                    Ok(Decision {
                        reasoning: String::new(),
                        action: a.to_string(),
                        target: None,
                        content: None,
                    })
                })
                .collect(),
        )
    }
}

impl DecisionProvider for ScriptedProvider {
    fn decide(&mut self, _ctx: &TurnContext) -> Result<Decision, ProviderError> {
        self.script.pop_front().unwrap_or_else(|| {
            Ok(Decision {
                reasoning: String::new(),
                action: "idle".to_string(),
                target: None,
                content: None,
            })
        })
    }

    fn kind(&self) -> &str {
        "scripted"
    }
}
