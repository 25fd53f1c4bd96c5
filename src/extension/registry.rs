//! Action registry: string ids to action constructors.
//!
//! The host fills the registry once at startup. The extension framework only
//! looks ids up; an id it cannot resolve is a validation error.

use crate::extension::config_tree::ConfigNode;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an action while running.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid action config: {0}")]
    InvalidConfig(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Executable behavior behind an extension command.
///
/// `run` receives the node's final config tree: its seed config with every
/// set flag and argument value bound in.
pub trait Action: Send + Sync {
    fn run(&self, config: &ConfigNode, out: &mut dyn Write) -> Result<(), ActionError>;
}

impl<F> Action for F
where
    F: Fn(&ConfigNode, &mut dyn Write) -> Result<(), ActionError> + Send + Sync,
{
    fn run(&self, config: &ConfigNode, out: &mut dyn Write) -> Result<(), ActionError> {
        self(config, out)
    }
}

/// Constructor producing a fresh action for one command node.
pub type ActionFactory = Arc<dyn Fn() -> Box<dyn Action> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionFactory>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `id`, replacing any earlier one.
    pub fn insert<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Action> + Send + Sync + 'static,
    {
        self.actions.insert(id.into(), Arc::new(factory));
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Action> + Send + Sync + 'static,
    {
        self.insert(id, factory);
        self
    }

    pub fn get(&self, id: &str) -> Option<&ActionFactory> {
        self.actions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.keys()).finish()
    }
}
