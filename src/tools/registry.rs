//! Action registry - catalogs and executes actions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ActionError;

use super::analysis::AnalysisAction;
use super::schema::{self, ParamSpec};
use super::thinking::ThinkingAction;
use super::Action;

/// Catalog entry exported to the engine and renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl ActionDescriptor {
    /// Function declaration in JSON Schema form
    pub fn to_function_schema(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": schema::object_schema(&self.parameters),
        })
    }
}

/// Registry holds the catalog of actions and executes invocations.
///
/// Built once at startup and shared read-only afterwards.
pub struct ActionRegistry {
    catalog: Vec<ActionDescriptor>,
    /// name -> (catalog index, handler)
    actions: HashMap<String, (usize, Box<dyn Action>)>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            catalog: Vec::new(),
            actions: HashMap::new(),
        }
    }

    /// Create a registry with the thinking and analysis actions
    pub fn with_reasoning_actions() -> Self {
        let mut registry = Self::new();
        registry.insert(Box::new(ThinkingAction));
        registry.insert(Box::new(AnalysisAction));
        registry
    }

    /// Register an action. Its schema is captured now and never changes.
    pub fn register<A: Action + 'static>(&mut self, action: A) -> Result<(), ActionError> {
        if self.actions.contains_key(action.name()) {
            return Err(ActionError::DuplicateName(action.name().to_string()));
        }
        self.insert(Box::new(action));
        Ok(())
    }

    fn insert(&mut self, action: Box<dyn Action>) {
        let name = action.name().to_string();
        debug!("Registering action: {}", name);
        self.catalog.push(action.to_descriptor());
        self.actions.insert(name, (self.catalog.len() - 1, action));
    }

    /// Ordered catalog of registered actions
    pub fn catalog(&self) -> &[ActionDescriptor] {
        &self.catalog
    }

    /// Validate arguments and run the named action
    pub fn invoke(&self, name: &str, arguments: &Value) -> Result<String, ActionError> {
        let (index, action) = self
            .actions
            .get(name)
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;

        let args = schema::validate(name, &self.catalog[*index].parameters, arguments)?;
        Ok(action.execute(&args))
    }

    /// Check if an action exists
    pub fn has(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered action names, in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.catalog.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
